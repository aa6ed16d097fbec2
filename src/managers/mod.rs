// Frameshell state managers
// Managers hold the shell's state machines: the frame store, the visibility
// arbiter, the overview controller, and the input decoder.

pub mod carousel_manager;
pub mod frame_manager;
pub mod input_manager;
pub mod visibility_arbiter;
