pub mod inline;
pub mod local;
pub mod s3;
