pub mod entry;
pub mod pass;
pub mod pass_type;
pub mod payment;
pub mod user;

pub use entry::{EntryEvent, PoolEntryView};
pub use pass::{ActivePass, NewPass, Pass, PassStatus, QrPayload, UserPassView};
pub use pass_type::PassType;
pub use payment::{NewPayment, Payment, PaymentStatus, MOCK_PAYMENT_METHOD};
pub use user::{NewUser, PublicUser, User};
