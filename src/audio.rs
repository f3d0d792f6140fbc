//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects, one short oscillator sweep per cue.
//! The event-to-cue mapping is plain Rust; only `AudioManager` needs a browser.

use crate::sim::state::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ordinary platform jump
    Jump,
    /// Bouncy platform or springs
    Bounce,
    /// Breakable platform crumbles
    Crumble,
    /// Disappearing platform fades
    Vanish,
    /// Landed on an enemy
    Stomp,
    /// Shield knocked an enemy away
    Zap,
    PowerUp,
    /// Score milestone reached
    Milestone,
    GameOver,
    /// Pause/resume/start blip
    Ui,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        Some(match event {
            GameEvent::Jumped(_) => SoundEffect::Jump,
            GameEvent::Bounced => SoundEffect::Bounce,
            GameEvent::PlatformBreaking(_) => SoundEffect::Crumble,
            GameEvent::PlatformVanishing(_) => SoundEffect::Vanish,
            GameEvent::EnemyStomped(_) => SoundEffect::Stomp,
            GameEvent::EnemyDestroyed(_) => SoundEffect::Zap,
            GameEvent::PowerUpCollected(_) => SoundEffect::PowerUp,
            GameEvent::MilestoneCrossed(_) => SoundEffect::Milestone,
            GameEvent::GameOver { .. } => SoundEffect::GameOver,
            GameEvent::Started | GameEvent::Paused | GameEvent::Resumed | GameEvent::Restarted => {
                SoundEffect::Ui
            }
            GameEvent::PlayerHit(_)
            | GameEvent::DifficultyIncreased(_)
            | GameEvent::PlayerRecovered(_) => return None,
        })
    }
}

/// Oscillator shape for a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One pitch sweep with an exponential fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub wave: Wave,
    pub from_hz: f32,
    pub to_hz: f32,
    /// Seconds after the cue starts
    pub delay: f64,
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn sweep(
    wave: Wave,
    from_hz: f32,
    to_hz: f32,
    delay: f64,
    duration: f64,
    gain: f32,
) -> Sweep {
    Sweep {
        wave,
        from_hz,
        to_hz,
        delay,
        duration,
        gain,
    }
}

use Wave::{Sawtooth, Sine, Square, Triangle};

const JUMP: &[Sweep] = &[sweep(Square, 300.0, 620.0, 0.0, 0.12, 0.2)];
const BOUNCE: &[Sweep] = &[
    sweep(Triangle, 200.0, 900.0, 0.0, 0.25, 0.35),
    sweep(Sine, 400.0, 1200.0, 0.05, 0.2, 0.15),
];
const CRUMBLE: &[Sweep] = &[
    sweep(Sawtooth, 220.0, 60.0, 0.0, 0.25, 0.3),
    sweep(Square, 90.0, 40.0, 0.03, 0.2, 0.15),
];
const VANISH: &[Sweep] = &[sweep(Sine, 900.0, 200.0, 0.0, 0.35, 0.2)];
const STOMP: &[Sweep] = &[sweep(Square, 180.0, 50.0, 0.0, 0.15, 0.4)];
const ZAP: &[Sweep] = &[sweep(Sawtooth, 1200.0, 300.0, 0.0, 0.12, 0.25)];
/// C-E-G arpeggio
const POWER_UP: &[Sweep] = &[
    sweep(Sine, 523.0, 523.0, 0.0, 0.08, 0.3),
    sweep(Sine, 659.0, 659.0, 0.08, 0.08, 0.3),
    sweep(Sine, 784.0, 784.0, 0.16, 0.15, 0.3),
];
const MILESTONE: &[Sweep] = &[
    sweep(Triangle, 784.0, 784.0, 0.0, 0.1, 0.3),
    sweep(Triangle, 1047.0, 1047.0, 0.1, 0.25, 0.3),
];
const GAME_OVER: &[Sweep] = &[
    sweep(Sawtooth, 400.0, 80.0, 0.0, 0.8, 0.3),
    sweep(Sine, 200.0, 50.0, 0.1, 0.8, 0.3),
];
const UI: &[Sweep] = &[sweep(Sine, 660.0, 660.0, 0.0, 0.05, 0.15)];

impl SoundEffect {
    /// Layers that make up the cue
    pub fn sweeps(self) -> &'static [Sweep] {
        match self {
            SoundEffect::Jump => JUMP,
            SoundEffect::Bounce => BOUNCE,
            SoundEffect::Crumble => CRUMBLE,
            SoundEffect::Vanish => VANISH,
            SoundEffect::Stomp => STOMP,
            SoundEffect::Zap => ZAP,
            SoundEffect::PowerUp => POWER_UP,
            SoundEffect::Milestone => MILESTONE,
            SoundEffect::GameOver => GAME_OVER,
            SoundEffect::Ui => UI,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, OscillatorType};

    use super::{SoundEffect, Sweep, Wave};
    use crate::settings::Settings;
    use crate::sim::state::GameEvent;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Pick up mute/volume changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Play the cues for a frame's events
        pub fn play_events(&self, events: &[GameEvent]) {
            for effect in events.iter().filter_map(SoundEffect::for_event) {
                self.play(effect);
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            for layer in effect.sweeps() {
                if self.play_sweep(ctx, layer).is_none() {
                    log::debug!("Dropped {:?} layer", effect);
                }
            }
        }

        fn play_sweep(&self, ctx: &AudioContext, sweep: &Sweep) -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(match sweep.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let t = ctx.current_time() + sweep.delay;
            let end = t + sweep.duration;
            gain.gain().set_value_at_time(0.0, ctx.current_time()).ok()?;
            gain.gain()
                .set_value_at_time(sweep.gain * self.volume, t)
                .ok()?;
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;
            osc.frequency().set_value_at_time(sweep.from_hz, t).ok()?;
            if sweep.to_hz != sweep.from_hz {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(sweep.to_hz, end)
                    .ok()?;
            }

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(end + 0.02).ok()?;
            Some(())
        }
    }
}
