/// Reader for the line based HXMS format
pub mod reader;
