mod account;
mod bar;
mod position;
mod side;

pub use account::{Account, SymbolInfo};
pub use bar::{Bar, Tick};
pub use position::{Position, PositionChange};
pub use side::Side;
