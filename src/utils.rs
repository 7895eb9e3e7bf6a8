pub mod utf16;
