mod change;
mod reset;

pub use change::ChangePasswordInput;
pub use reset::{RESET_TOKEN_TTL, RequestResetInput, ResetPasswordInput};
