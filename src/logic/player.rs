use anyhow::{Result, ensure};

use crate::data::Player;

impl Player {
    pub fn new(initial_lives: u32) -> Result<Self> {
        ensure!(initial_lives > 0, "a player needs at least one life");
        Ok(Self {
            lives: initial_lives,
            initial_lives,
        })
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn initial_lives(&self) -> u32 {
        self.initial_lives
    }

    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn has_lives(&self) -> bool {
        self.lives > 0
    }

    pub fn reset_lives(&mut self) {
        self.lives = self.initial_lives;
    }
}
