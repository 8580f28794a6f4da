//! SQLite repositories
//!
//! Row and input types live in `crate::data::types`.

pub mod custom_field;
pub mod custom_field_value;
pub mod query;
pub mod system;
pub mod toy;
pub mod video_game;
pub mod video_game_box;

pub use custom_field::{
    create_custom_field, delete_custom_field, get_by_name_and_key, get_custom_field,
    list_custom_fields, rename_custom_field,
};
pub use system::{
    create_system, delete_system, find_system_id, get_system, list_systems, update_system,
};
pub use toy::{create_toy, delete_toy, find_toy_id, get_toy, list_toys, update_toy};
pub use video_game::{delete_video_game, get_video_game, list_video_games, update_video_game};
pub use video_game_box::{
    create_video_game_box, delete_video_game_box, find_video_game_box_id, get_video_game_box,
    list_video_game_boxes,
};
