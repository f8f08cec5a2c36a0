//! Shared constants for end-to-end tests

// ============================================================================
// Scenes
// ============================================================================

pub const SCENE_A: &str = "scene-a";
pub const SCENE_B: &str = "scene-b";
pub const SCENE_C: &str = "scene-c";

pub const INDIE_UK: &str = "indie-uk";
pub const INDIE_UK_NAME: &str = "UK Indie";

pub const DREAM_POP: &str = "dream-pop";
pub const DREAM_POP_NAME: &str = "Dream Pop";

// ============================================================================
// Artists and users
// ============================================================================

pub const ARTIST_X: &str = "artist-x";
pub const USER_1: &str = "user-1";
