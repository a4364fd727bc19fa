mod gateway;
mod meter;
mod scalar;
mod snapshot;

pub use self::gateway::Gateway;
pub use self::meter::{Meter, Reading};
pub use self::scalar::Scalar;
pub use self::snapshot::{SeqToken, Snapshot};
