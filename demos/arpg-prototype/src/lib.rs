use wasm_bindgen::prelude::*;
use arpg_core::*;

mod game;
use game::ArpgPrototype;

arpg_web::export_game!(ArpgPrototype, "arpg-prototype");
