pub mod notification;

pub use notification::PasscodeNotifier;
