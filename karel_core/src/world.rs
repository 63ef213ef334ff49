use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    board::{Board, BoardError, Wall},
};

/// Represents errors in an initial world configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("More than one beeper placed at {0:?}")]
    DuplicateBeeper(Position),
    #[error("{count} beepers exceed the capacity of {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },
}

/// Represents actions the robot can be told to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move,
    TurnLeft,
    TurnRight,
    PickBeeper,
    PutBeeper,
}

/// Why an action left the world unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("target cell is off the board")]
    OutOfBounds,
    #[error("a wall blocks the way")]
    Wall,
    #[error("no beeper on this cell")]
    NoBeeper,
    #[error("robot carries no beepers")]
    NoBeepersCarried,
    #[error("cell already holds a beeper")]
    CellOccupied,
    #[error("board already holds the maximum number of beepers")]
    CapacityExceeded,
    #[error("robot cannot carry any more beepers")]
    CarryLimit,
}

/// Represents the outcome of processing an action.
///
/// A rejected action never changes the world, so callers that only redraw may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Rejected(Rejection),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }
}

/// Holds the state of the robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub position: Position,
    pub direction: Direction,
    /// Beepers currently carried, not placed on the board.
    pub beepers: usize,
}

/// Initial setup of a world. Consumed once by [`World::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    pub start: Position,
    pub facing: Direction,
    pub carried: usize,
    pub beepers: Vec<Position>,
    /// Pairs of adjacent cells with a wall between them.
    pub walls: Vec<(Position, Position)>,
    /// Maximum number of beepers that may lie on the board at once.
    pub capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 10,
            height: 10,
            start: Position::new(0, 0),
            facing: Direction::East,
            carried: 0,
            beepers: vec![Position::new(2, 2), Position::new(3, 3)],
            walls: vec![
                (Position::new(1, 0), Position::new(1, 1)),
                (Position::new(2, 2), Position::new(3, 2)),
            ],
            capacity: 10,
        }
    }
}

/// The robot, its beepers and the walls of a single board.
#[derive(Debug, Clone)]
pub struct World {
    board: Board,
    robot: Robot,
    beepers: Vec<Position>,
    walls: Vec<Wall>,
    capacity: usize,
}

impl World {
    /// Builds a world from `config`, validating every placement.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let board = Board::new(config.width, config.height)?;
        board.check(config.start)?;

        if config.beepers.len() > config.capacity {
            return Err(WorldError::CapacityExceeded {
                count: config.beepers.len(),
                capacity: config.capacity,
            });
        }
        let mut beepers: Vec<Position> = Vec::with_capacity(config.capacity);
        for position in config.beepers {
            board.check(position)?;
            if beepers.contains(&position) {
                return Err(WorldError::DuplicateBeeper(position));
            }
            beepers.push(position);
        }

        let walls = config
            .walls
            .into_iter()
            .map(|(a, b)| {
                board.check(a)?;
                board.check(b)?;
                Wall::new(a, b)
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "World {}x{} created: robot at ({}, {}) facing {}, {} beepers, {} walls",
            board.width(),
            board.height(),
            config.start.x,
            config.start.y,
            config.facing,
            beepers.len(),
            walls.len()
        );

        Ok(World {
            board,
            robot: Robot {
                position: config.start,
                direction: config.facing,
                beepers: config.carried,
            },
            beepers,
            walls,
            capacity: config.capacity,
        })
    }

    /// True iff a wall lies between `position` and its neighbor in `direction`.
    ///
    /// Only that single edge is considered; walls on other sides of the cell are ignored.
    pub fn wall_blocks(&self, position: Position, direction: Direction) -> bool {
        match self.board.neighbor(position, direction) {
            Some(next) => self.walls.iter().any(|w| w.between(position, next)),
            None => false,
        }
    }

    /// Index into [`World::beepers`] of the beeper at `position`, if any.
    pub fn beeper_index_at(&self, position: Position) -> Option<usize> {
        self.beepers.iter().position(|&b| b == position)
    }

    /// Steps one cell forward unless the board edge or a wall is in the way.
    pub fn move_forward(&mut self) -> ActionResult {
        let Robot {
            position,
            direction,
            ..
        } = self.robot;
        let Some(target) = self.board.neighbor(position, direction) else {
            return reject(Action::Move, Rejection::OutOfBounds);
        };
        if self.wall_blocks(position, direction) {
            return reject(Action::Move, Rejection::Wall);
        }
        self.robot.position = target;
        ActionResult::Success
    }

    pub fn turn_left(&mut self) -> ActionResult {
        self.robot.direction = self.robot.direction.turn_left();
        ActionResult::Success
    }

    pub fn turn_right(&mut self) -> ActionResult {
        self.robot.direction = self.robot.direction.turn_right();
        ActionResult::Success
    }

    /// Takes the beeper on the robot's cell into its bag.
    pub fn pick_beeper(&mut self) -> ActionResult {
        let Some(index) = self.beeper_index_at(self.robot.position) else {
            return reject(Action::PickBeeper, Rejection::NoBeeper);
        };
        let Some(carried) = self.robot.beepers.checked_add(1) else {
            return reject(Action::PickBeeper, Rejection::CarryLimit);
        };
        // Placement order carries no meaning.
        self.beepers.swap_remove(index);
        self.robot.beepers = carried;
        ActionResult::Success
    }

    /// Drops a carried beeper onto the robot's cell. Beepers never stack.
    pub fn put_beeper(&mut self) -> ActionResult {
        if self.robot.beepers == 0 {
            return reject(Action::PutBeeper, Rejection::NoBeepersCarried);
        }
        if self.beeper_index_at(self.robot.position).is_some() {
            return reject(Action::PutBeeper, Rejection::CellOccupied);
        }
        if self.beepers.len() >= self.capacity {
            return reject(Action::PutBeeper, Rejection::CapacityExceeded);
        }
        self.beepers.push(self.robot.position);
        self.robot.beepers -= 1;
        ActionResult::Success
    }

    /// Dispatches a single action.
    pub fn process_action(&mut self, action: Action) -> ActionResult {
        match action {
            Action::Move => self.move_forward(),
            Action::TurnLeft => self.turn_left(),
            Action::TurnRight => self.turn_right(),
            Action::PickBeeper => self.pick_beeper(),
            Action::PutBeeper => self.put_beeper(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn robot(&self) -> &Robot {
        &self.robot
    }
    /// Current beeper placements, in no particular order.
    pub fn beepers(&self) -> &[Position] {
        &self.beepers
    }
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// One-line summary of the robot for a status bar.
    pub fn status_line(&self) -> String {
        let Robot {
            position,
            direction,
            beepers,
        } = &self.robot;
        format!(
            "Position: ({}, {}) | Beepers: {} | Facing: {}",
            position.x, position.y, beepers, direction
        )
    }
}

fn reject(action: Action, rejection: Rejection) -> ActionResult {
    log::debug!("{:?} rejected: {}", action, rejection);
    ActionResult::Rejected(rejection)
}
