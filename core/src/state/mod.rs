mod store;

pub use store::{ActivitySnapshot, ActivityStore, UserActivityRecord};
