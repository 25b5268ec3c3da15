//! Board configuration.

use broadside_protocol::Ship;
use serde::{Deserialize, Serialize};

/// How ships end up on a fresh board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Place each ship of [`BoardConfig::fleet`] at a random free spot.
    Random,
    /// Use exactly these ships on every board. `fleet` is ignored.
    Fixed(Vec<Ship>),
}

/// Configuration for [`MemoryBoardService`](crate::MemoryBoardService).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Width and height of the square grid.
    pub size: u8,

    /// Ship lengths to place when `placement` is `Random`.
    pub fleet: Vec<u8>,

    pub placement: Placement,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: 10,
            fleet: vec![5, 4, 3, 3, 2],
            placement: Placement::Random,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_config_default() {
        let config = BoardConfig::default();
        assert_eq!(config.size, 10);
        assert_eq!(config.fleet, vec![5, 4, 3, 3, 2]);
        assert_eq!(config.placement, Placement::Random);
    }
}
