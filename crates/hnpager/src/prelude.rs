pub use crate::error::{Error, FetchResult};

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Result};
pub use log::{debug, info, warn};
