pub mod aggregate;
pub mod io;
pub mod number;
pub mod table;
