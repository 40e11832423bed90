//! Soundtrack playback.
//!
//! Only one sculpture soundtrack plays at a time. Starting a new one stops
//! whatever was playing, which [`NowPlaying`] enforces independently of the
//! audio backend so the rule can be tested without a sound device.

use crate::assets::{ClipLoad, spawn_clip_loader};
use crate::game::entity::ClipId;
use kira::Decibels;
use kira::Tween;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, DefaultBackend};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

/// Linear gain of 0.7 expressed in decibels.
const CLIP_VOLUME: f32 = -3.1;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Device(String),
}

/// Sink for soundtrack requests coming out of the click handler.
pub trait Soundtrack {
    /// Stops the current clip, if any, and starts `clip`.
    fn play(&mut self, clip: ClipId);

    /// Called once per frame to pick up finished background work.
    fn poll(&mut self) {}
}

/// Used when no audio device could be opened.
#[derive(Debug, Default)]
pub struct SilentSoundtrack;

impl Soundtrack for SilentSoundtrack {
    fn play(&mut self, clip: ClipId) {
        tracing::debug!("audio disabled, not playing clip {}", clip.0);
    }
}

/// A handle to something audible that can be cut off.
pub trait Stoppable {
    fn stop(&mut self);
}

impl Stoppable for StaticSoundHandle {
    fn stop(&mut self) {
        StaticSoundHandle::stop(self, Tween::default());
    }
}

/// Single now-playing slot.
#[derive(Debug)]
pub struct NowPlaying<H> {
    current: Option<H>,
}

impl<H> Default for NowPlaying<H> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<H: Stoppable> NowPlaying<H> {
    /// Stops the previous handle and keeps `handle` as the current one.
    pub fn replace(&mut self, handle: H) {
        self.stop();
        self.current = Some(handle);
    }

    pub fn stop(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }
}

/// kira-backed soundtrack player.
///
/// Clips are decoded on background threads; until a clip has arrived,
/// requests for it are dropped with a debug log.
pub struct GameAudioManager {
    audio_manager: AudioManager<DefaultBackend>,
    clips: HashMap<ClipId, StaticSoundData>,
    incoming: Option<Receiver<ClipLoad>>,
    now_playing: NowPlaying<StaticSoundHandle>,
}

impl GameAudioManager {
    /// Opens the default output device and starts decoding `sources`.
    pub fn new(sources: Vec<(ClipId, PathBuf)>) -> Result<Self, AudioError> {
        let audio_manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|err| AudioError::Device(err.to_string()))?;

        Ok(GameAudioManager {
            audio_manager,
            clips: HashMap::new(),
            incoming: Some(spawn_clip_loader(sources)),
            now_playing: NowPlaying::default(),
        })
    }
}

impl Soundtrack for GameAudioManager {
    fn play(&mut self, clip: ClipId) {
        self.now_playing.stop();
        let Some(data) = self.clips.get(&clip) else {
            tracing::debug!("clip {} is not loaded, staying silent", clip.0);
            return;
        };
        match self.audio_manager.play(data.clone().volume(Decibels(CLIP_VOLUME))) {
            Ok(handle) => self.now_playing.replace(handle),
            Err(err) => tracing::warn!("failed to play clip {}: {err:?}", clip.0),
        }
    }

    fn poll(&mut self) {
        let Some(receiver) = &self.incoming else {
            return;
        };
        loop {
            match receiver.try_recv() {
                Ok((clip, Ok(data))) => {
                    tracing::info!("loaded clip {}", clip.0);
                    self.clips.insert(clip, data);
                }
                Ok((_, Err(err))) => tracing::warn!("{err}"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("all clips processed ({} loaded)", self.clips.len());
                    self.incoming = None;
                    break;
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeHandle {
        stops: Rc<Cell<u32>>,
    }

    impl Stoppable for FakeHandle {
        fn stop(&mut self) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    /// Starting a new clip stops the previous one and only that one.
    #[test]
    fn test_now_playing_stops_previous() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut slot = NowPlaying::default();
        assert!(!slot.is_playing());

        slot.replace(FakeHandle {
            stops: first.clone(),
        });
        slot.replace(FakeHandle {
            stops: second.clone(),
        });
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);

        slot.stop();
        slot.stop();
        assert_eq!(second.get(), 1);
        assert!(!slot.is_playing());
    }

    #[test]
    fn test_silent_soundtrack_accepts_requests() {
        let mut silent = SilentSoundtrack;
        silent.play(ClipId(3));
        silent.poll();
    }
}
