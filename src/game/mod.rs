//! Session state management module.
//!
//! This module defines the [`Session`] struct, which owns everything that
//! changes while walking a maze: the carved grid, the entity store, the
//! collision world, the player and the interaction state. Building a new
//! session rebuilds all of it from a [`GameConfig`] and a [`Dice`].

pub mod audio;
pub mod collision;
pub mod entity;
pub mod interaction;
pub mod keys;
pub mod player;

use self::audio::Soundtrack;
use self::collision::CollisionWorld;
use self::entity::{
    Body, ClipId, Entities, EntityId, EntityKind, Figure, PreviewDescriptor, Sculpture,
    Shape,
};
use self::interaction::{
    ClickOutcome, EscapeSequence, RemovalQueue, SessionEvent, exit_pulse, strike,
};
use self::player::{MoveInput, Player};
use crate::config::{ConfigError, GameConfig};
use crate::maze::Dice;
use crate::maze::exit::{ExitChoice, ExitGeometry, ExitSelector};
use crate::maze::generator::MazeGenerator;
use crate::maze::grid::Grid;
use crate::maze::placement::PlacementSampler;
use crate::math::vec::Vec3;
use std::path::PathBuf;
use std::time::Instant;

/// One walk through one maze.
///
/// The session is updated every frame and contains:
/// - The grid and the exit that was carved into it.
/// - Every entity, with the collision boxes recorded at placement time.
/// - The player and their orientation.
/// - Pending removals and the escape sequence.
pub struct Session {
    config: GameConfig,
    grid: Grid,
    exit: ExitChoice,
    exit_entity: EntityId,
    entities: Entities,
    collision: CollisionWorld,
    player: Player,
    escape: EscapeSequence,
    removals: RemovalQueue,
    /// Seconds simulated so far; drives the exit pulse.
    clock: f32,
    /// Bumped whenever an entity is added, removed, moved or marked.
    revision: u64,
}

impl Session {
    /// Validates `config`, carves a maze and populates it.
    pub fn new(config: GameConfig, dice: &mut impl Dice) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut grid = MazeGenerator::new(config.rows, config.cols).carve(dice);
        let exit = ExitSelector::select(&mut grid, dice);

        let cell_size = config.cell_size;
        let mut entities = Entities::new();
        let mut collision = CollisionWorld::new();

        for cell in grid.blocked_cells() {
            let (x, z) = grid.cell_to_world(cell, cell_size);
            let body = Body::Cuboid {
                size: [cell_size, config.wall_height, cell_size],
            };
            let center = [x, config.wall_height / 2.0, z];
            let id = entities.spawn(EntityKind::Wall, center, body);
            collision.insert(id, body.bounds(center));
        }

        let geometry = ExitGeometry::for_cell(
            &grid,
            exit.cell,
            cell_size,
            config.exit_height,
            config.exit_protrusion,
        );
        let exit_entity = entities.spawn(
            EntityKind::Exit,
            geometry.center,
            Body::Cuboid {
                size: geometry.size,
            },
        );

        let mut sampler = PlacementSampler::new(&grid, exit.cell, cell_size);
        let mut placed_per_batch = Vec::with_capacity(config.sculptures.len() + 1);

        for (index, batch) in config.sculptures.iter().enumerate() {
            let placements = sampler.sample(dice, batch.count, batch.jitter);
            placed_per_batch.push((batch.name.as_str(), placements.len()));
            for placement in placements {
                let size = batch.size.sample([dice.unit(), dice.unit(), dice.unit()]);
                let (x, z) = placement.position;
                let center = [x, size[1] / 2.0, z];
                let body = Body::Cuboid { size };
                let kind = EntityKind::Sculpture(Sculpture {
                    batch: index,
                    clip: batch.audio.as_ref().map(|_| ClipId(index)),
                    clicks: 0,
                    marks: Vec::new(),
                    doomed: false,
                    preview: PreviewDescriptor::sculpture(batch.image.clone()),
                });
                let id = entities.spawn(kind, center, body);
                collision.insert(id, body.bounds(center));
            }
        }

        let figures = &config.figures;
        let placements = sampler.sample(dice, figures.count, figures.jitter);
        placed_per_batch.push(("figures", placements.len()));
        for placement in placements {
            let shape = Shape::ALL[dice.below(Shape::ALL.len())];
            let scale = figures.scale.0 + (figures.scale.1 - figures.scale.0) * dice.unit();
            let body = figure_body(shape, scale);
            let (x, z) = placement.position;
            let center = [x, body.height() / 2.0, z];
            let kind = EntityKind::Figure(Figure {
                shape,
                color: figures.color,
                preview: PreviewDescriptor::mini(shape, figures.color),
            });
            let id = entities.spawn(kind, center, body);
            collision.insert(id, body.bounds(center));
        }

        let start = grid.start();
        let (x, z) = grid.cell_to_world(start, cell_size);
        let player = Player::new([x, config.player.start_height, z], &config.player);

        tracing::info!(
            "carved {}x{} maze: {} open cells, exit at ({}, {}){}",
            grid.rows,
            grid.cols,
            grid.passable_count(),
            exit.cell.row,
            exit.cell.col,
            if exit.fallback { " (fallback)" } else { "" }
        );
        for (name, placed) in &placed_per_batch {
            tracing::debug!("placed {placed} from batch {name}");
        }
        tracing::info!(
            "{} entities, {} collision boxes",
            entities.len(),
            collision.len()
        );

        Ok(Self {
            escape: EscapeSequence::new(&config.interaction),
            config,
            grid,
            exit,
            exit_entity,
            entities,
            collision,
            player,
            removals: RemovalQueue::new(),
            clock: 0.0,
            revision: 0,
        })
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Steps the player, animates the escape and retires sculptures whose
    /// removal deadline is at or before `now`.
    pub fn update(&mut self, input: &MoveInput, dt: f32, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.clock += dt;
        self.player.step(input, dt, &self.collision);

        if let Some(frame) = self.escape.advance(dt) {
            for entity in self.entities.iter_mut() {
                match entity.kind {
                    EntityKind::Wall => entity.position[1] = entity.origin[1] + frame.wall_offset,
                    EntityKind::Sculpture(_) => entity.position[1] += frame.rise,
                    _ => {}
                }
            }
            self.revision += 1;
            if frame.completed {
                tracing::info!("escape complete");
                events.push(SessionEvent::EscapeCompleted);
            }
        }

        for id in self.removals.poll(now) {
            let removed = self.entities.despawn(id).is_some();
            let boxes = self.collision.remove(id);
            if removed {
                tracing::info!("sculpture {} destroyed ({boxes} boxes cleared)", id.0);
                self.revision += 1;
                events.push(SessionEvent::Removed(id));
            }
        }
        events
    }

    /// Applies a pointer delta to the player's view.
    pub fn look(&mut self, delta_x: f64, delta_y: f64) {
        self.player.look(delta_x, delta_y);
    }

    /// Resolves a click along the player's line of sight.
    pub fn click(&mut self, now: Instant, audio: &mut dyn Soundtrack) -> ClickOutcome {
        let Some(hit) = self.entities.raycast(&self.player.aim()) else {
            return ClickOutcome::Miss;
        };
        let Some(entity) = self.entities.get_mut(hit.entity) else {
            return ClickOutcome::Miss;
        };

        match &mut entity.kind {
            EntityKind::Figure(figure) => {
                tracing::debug!("previewing {}", figure.preview.info);
                ClickOutcome::Preview(figure.preview.clone())
            }
            EntityKind::Sculpture(sculpture) => {
                let local = (hit.point - Vec3::from(entity.position)).into();
                let threshold = self.config.interaction.click_threshold;
                self.revision += 1;
                if !strike(sculpture, local, threshold) {
                    return ClickOutcome::Struck {
                        clicks: sculpture.clicks,
                    };
                }
                if let Some(clip) = sculpture.clip {
                    audio.play(clip);
                }
                self.removals
                    .schedule(hit.entity, now, self.config.interaction.removal_delay());
                tracing::info!("sculpture {} will be destroyed", hit.entity.0);
                ClickOutcome::Doomed(hit.entity)
            }
            EntityKind::Exit => {
                if !self.escape.trigger() {
                    return ClickOutcome::Ignored;
                }
                self.collision.clear();
                tracing::info!("escape started");
                ClickOutcome::EscapeStarted
            }
            EntityKind::Wall => ClickOutcome::Ignored,
        }
    }

    /// Soundtracks referenced by the sculpture batches, keyed by batch.
    pub fn clip_sources(&self) -> Vec<(ClipId, PathBuf)> {
        clip_sources(&self.config)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    /// Current exit glow, pulsing between 0 and 1.
    pub fn exit_glow(&self) -> f32 {
        exit_pulse(self.clock)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Soundtracks referenced by `config`, one per sculpture batch that has one.
pub fn clip_sources(config: &GameConfig) -> Vec<(ClipId, PathBuf)> {
    config
        .sculptures
        .iter()
        .enumerate()
        .filter_map(|(index, batch)| Some((ClipId(index), batch.audio.clone()?)))
        .collect()
}

/// Collision and render body of a mini figure at `scale`.
pub fn figure_body(shape: Shape, scale: f32) -> Body {
    match shape {
        Shape::Box => Body::Cuboid {
            size: [0.8 * scale; 3],
        },
        Shape::Sphere => Body::Sphere { radius: 0.5 * scale },
        Shape::Cylinder => Body::Cylinder {
            radius: 0.4 * scale,
            height: 0.8 * scale,
        },
    }
}
