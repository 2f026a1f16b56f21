//! Page objects for the vaccination service.
//!
//! Pages only describe screens: every interaction goes through
//! [`Session::act`](vaxprobe::Session::act) and
//! [`Session::verify`](vaxprobe::Session::verify).

mod children;
mod consent;
mod vaccines;

pub use children::ChildrenPage;
pub use consent::ConsentPage;
pub use vaccines::{Batch, VaccinesPage, HPV_VACCINE};
