mod common;
mod postgres;
mod read_api;
mod registry;
