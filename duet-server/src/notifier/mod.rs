mod lifecycle_notifier;

pub use lifecycle_notifier::*;
