mod auth;
mod dashboard;
mod generate;
mod history;
mod quiz;
mod render;
mod results;
mod review;

pub use render::render;
