mod connection;
mod credential;
mod ir_code;
mod response;

pub use connection::ConnectionRepository;
pub use credential::CredentialRepository;
pub use ir_code::IrCodeRepository;
pub use response::ResponseRepository;
