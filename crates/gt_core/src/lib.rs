pub mod canvas;
pub mod config;
pub mod game_object;
pub mod input;
pub mod primitive;
pub mod sprite;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;
