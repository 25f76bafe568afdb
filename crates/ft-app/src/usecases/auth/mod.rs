mod sign_in;
mod sign_out;
mod sign_up;

pub use sign_in::SignInWithPassword;
pub use sign_out::SignOutEverywhere;
pub use sign_up::SignUp;
