//! Named colours used by the built-in lessons.

use crate::script::Color;

pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
pub const LOGO_WHITE: Color = Color::rgb(0xEC, 0xE7, 0xE2);
pub const GREY: Color = Color::rgb(0x88, 0x88, 0x88);
pub const GREY_E: Color = Color::rgb(0x22, 0x22, 0x22);

pub const BLUE_A: Color = Color::rgb(0xC7, 0xE9, 0xF1);
pub const BLUE_B: Color = Color::rgb(0x9C, 0xDC, 0xEB);
pub const BLUE_D: Color = Color::rgb(0x29, 0xAB, 0xCA);
pub const BLUE_E: Color = Color::rgb(0x1C, 0x75, 0x8A);

pub const TEAL: Color = Color::rgb(0x5C, 0xD0, 0xB3);
pub const TEAL_A: Color = Color::rgb(0xAC, 0xEA, 0xD7);
pub const TEAL_B: Color = Color::rgb(0x76, 0xDD, 0xC0);
pub const TEAL_D: Color = Color::rgb(0x55, 0xC1, 0xA7);
pub const TEAL_E: Color = Color::rgb(0x49, 0xA8, 0x8F);

pub const GREEN_A: Color = Color::rgb(0xC9, 0xE2, 0xAE);
pub const GREEN_B: Color = Color::rgb(0xA6, 0xCF, 0x8C);
pub const GREEN_C: Color = Color::rgb(0x83, 0xC1, 0x67);

pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
pub const YELLOW_B: Color = Color::rgb(0xFF, 0xEA, 0x94);
pub const YELLOW_D: Color = Color::rgb(0xF4, 0xD3, 0x45);
pub const YELLOW_E: Color = Color::rgb(0xE8, 0xC1, 0x1C);
pub const GOLD: Color = Color::rgb(0xF0, 0xAC, 0x5F);
pub const ORANGE: Color = Color::rgb(0xFF, 0x86, 0x2F);

pub const RED: Color = Color::rgb(0xFC, 0x62, 0x55);
pub const RED_A: Color = Color::rgb(0xF7, 0xA1, 0xA3);

pub const PURPLE_A: Color = Color::rgb(0xCA, 0xA3, 0xE8);
pub const PURPLE_B: Color = Color::rgb(0xB1, 0x89, 0xC6);
pub const PURPLE_E: Color = Color::rgb(0x64, 0x41, 0x72);
