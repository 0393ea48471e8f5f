mod common;
mod routing;
mod submission;
