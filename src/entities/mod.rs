pub mod movie;
pub mod pref;
pub mod review;
pub mod video;
