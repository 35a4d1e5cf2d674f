mod common;
mod routing;
mod stats;
