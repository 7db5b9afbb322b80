mod connection;
mod credential;
mod ir_code;
mod response_record;

pub use connection::{Connection, ConnectionTable};
pub use credential::{Credential, CredentialTable};
pub use ir_code::{IrCode, IrCodeTable};
pub use response_record::{ResponseRecord, ResponseTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;
}
