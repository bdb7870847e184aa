pub mod city_frame;
pub mod day_index;
pub mod error;
pub mod location;
pub mod metadata;
pub mod parameter;
