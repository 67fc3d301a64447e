pub mod icon_theme;

pub use icon_theme::IconThemeService;
