//! Bill splitting engine.
//!
//! A [`Room`] holds the people sharing a bill ([`Member`]), the itemized lines
//! ([`Item`]) each tagged to the members sharing it, and a grand total edited
//! independently of the items. [`compute_split`] turns items and total into
//! what each member owes; [`SplitReport`] adds member ordering and
//! reconciliation warnings on top. [`Engine`] keeps rooms in memory and lets
//! viewers subscribe to changes.

pub use code::RoomCode;
pub use error::EngineError;
pub use money::MoneyCents;
pub use report::{SUM_TOLERANCE, SplitReport, SplitWarning};
pub use room::{Item, ItemId, Member, MemberId, Room};
pub use split::{MemberBill, assigned_subtotal, bills_total, compute_split, subtotal};
pub use store::{DEFAULT_CODE_ATTEMPTS, Engine, EngineBuilder};

mod code;
mod error;
mod money;
mod report;
mod room;
mod split;
mod store;

type ResultEngine<T> = Result<T, EngineError>;
