//! The SPU: 13 control-bus ports, a BIOS sound plus up to
//! [`SPU_MAXIMUM_CARTRIDGE_SOUNDS`] cartridge sounds, 16 mixer channels,
//! and the lock-free playback buffer ring (`spec.md` §4.8). Grounded on
//! `original_source/DesktopEmulator/ConsoleLogic/V32SPU.{hpp,cpp}` and
//! `V32SPUWriters.cpp`.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::constants::{BUFFER_SAMPLES, MAX_BUFFERS, SPU_MAXIMUM_CARTRIDGE_SOUNDS, SPU_SOUND_CHANNELS};
use crate::word::{Sample, Word};

const LAST_PORT: u32 = 13;
const FIRST_SOUND_PORT: u32 = 4;
const FIRST_CHANNEL_PORT: u32 = 8;

const COMMAND_PLAY_SELECTED_CHANNEL: i32 = 0x30;
const COMMAND_PAUSE_SELECTED_CHANNEL: i32 = 0x31;
const COMMAND_STOP_SELECTED_CHANNEL: i32 = 0x32;
const COMMAND_PAUSE_ALL_CHANNELS: i32 = 0x33;
const COMMAND_RESUME_ALL_CHANNELS: i32 = 0x34;
const COMMAND_STOP_ALL_CHANNELS: i32 = 0x35;

const CHANNEL_STATE_STOPPED: i32 = 0x40;
const CHANNEL_STATE_PAUSED: i32 = 0x41;
const CHANNEL_STATE_PLAYING: i32 = 0x42;

fn clamp_f32(value: f32, min: f32, max: f32) -> f32 {
    value.clamp(min, max)
}

/// A loaded sound: BIOS or cartridge, fixed in place once connected.
#[derive(Clone, Debug, Default)]
pub struct SpuSound {
    pub length: i32,
    pub play_with_loop: bool,
    pub loop_start: i32,
    pub loop_end: i32,
    pub samples: Vec<Sample>,
}

impl SpuSound {
    fn load(&mut self, samples: Vec<Sample>) {
        self.length = samples.len() as i32;
        self.play_with_loop = false;
        self.loop_start = 0;
        self.loop_end = self.length - 1;
        self.samples = samples;
    }

    fn unload(&mut self) {
        self.samples.clear();
        self.length = 0;
        self.loop_start = 0;
        self.loop_end = -1;
    }

    /// Restores default loop properties without discarding samples,
    /// matching `V32SPU::Reset` (which rewinds loop points but keeps
    /// any loaded sound data across a console reset).
    fn reset_loop(&mut self) {
        self.play_with_loop = false;
        self.loop_start = 0;
        self.loop_end = self.length - 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Stopped,
    Paused,
    Playing,
}

impl ChannelState {
    fn code(self) -> i32 {
        match self {
            ChannelState::Stopped => CHANNEL_STATE_STOPPED,
            ChannelState::Paused => CHANNEL_STATE_PAUSED,
            ChannelState::Playing => CHANNEL_STATE_PLAYING,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpuChannel {
    pub state: ChannelState,
    /// `-1` means the BIOS sound, `0..` indexes `cartridge_sounds`.
    pub assigned_sound: i32,
    pub volume: f32,
    pub speed: f32,
    pub loop_enabled: bool,
    /// Needs the extra range/precision of `f64`, exactly as the source.
    pub position: f64,
}

impl Default for SpuChannel {
    fn default() -> Self {
        SpuChannel {
            state: ChannelState::Stopped,
            assigned_sound: -1,
            volume: 0.5,
            speed: 1.0,
            loop_enabled: false,
            position: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum BufferState {
    ToBeFilled = 0,
    Filled = 1,
    QueuedToPlay = 2,
}

impl BufferState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => BufferState::ToBeFilled,
            1 => BufferState::Filled,
            _ => BufferState::QueuedToPlay,
        }
    }
}

/// One ring slot. `samples` is only ever touched by whichever single
/// owner currently holds the slot (producer while `ToBeFilled`,
/// playback thread from `Filled`/`QueuedToPlay` onward), so the
/// `UnsafeCell` never sees concurrent access despite not being behind a
/// mutex — the state/sequence atomics are the handoff, not a lock.
struct SoundBuffer {
    state: AtomicU8,
    sequence: AtomicU64,
    samples: UnsafeCell<[Sample; BUFFER_SAMPLES]>,
}

unsafe impl Sync for SoundBuffer {}

impl SoundBuffer {
    fn new() -> Self {
        SoundBuffer {
            state: AtomicU8::new(BufferState::ToBeFilled as u8),
            sequence: AtomicU64::new(0),
            samples: UnsafeCell::new([Sample { left: 0, right: 0 }; BUFFER_SAMPLES]),
        }
    }

    fn state(&self) -> BufferState {
        BufferState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// The lock-free handoff ring between the frame thread (producer) and
/// the optional playback thread (consumer). `spec.md` §9 [ADD]:
/// `Arc<[SoundBuffer]>` with `AtomicU8` state plus `AtomicU64` sequence
/// number per slot, never a mutex.
pub struct BufferRing {
    buffers: Box<[SoundBuffer]>,
    next_sequence: AtomicU64,
    running: AtomicBool,
}

impl BufferRing {
    fn new() -> Arc<Self> {
        Arc::new(BufferRing {
            buffers: (0..MAX_BUFFERS).map(|_| SoundBuffer::new()).collect(),
            next_sequence: AtomicU64::new(0),
            running: AtomicBool::new(true),
        })
    }

    /// Resets every slot to `ToBeFilled`, then seeds the pipeline by
    /// pre-filling half the ring with silence so the consumer has
    /// something to play immediately instead of starving on the first
    /// few frames after power-on (`spec.md` §4.6).
    fn reset(&self) {
        for buffer in self.buffers.iter() {
            buffer.state.store(BufferState::ToBeFilled as u8, Ordering::Release);
            buffer.sequence.store(0, Ordering::Release);
        }
        self.next_sequence.store(0, Ordering::Release);

        let silence = [Sample { left: 0, right: 0 }; BUFFER_SAMPLES];
        for index in 0..self.buffers.len() / 2 {
            self.fill(index, silence);
        }
    }

    fn find_to_fill(&self) -> Option<usize> {
        self.buffers.iter().position(|b| b.state() == BufferState::ToBeFilled)
    }

    /// Producer-only: writes `samples` into the chosen slot and makes
    /// it available to the consumer.
    fn fill(&self, index: usize, samples: [Sample; BUFFER_SAMPLES]) {
        let buffer = &self.buffers[index];
        unsafe { *buffer.samples.get() = samples };
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        buffer.sequence.store(sequence, Ordering::Release);
        buffer.state.store(BufferState::Filled as u8, Ordering::Release);
    }

    /// Consumer-only: claims the oldest `Filled` buffer for playing.
    fn claim_to_play(&self) -> Option<usize> {
        self.buffers
            .iter()
            .enumerate()
            .filter(|(_, b)| b.state() == BufferState::Filled)
            .min_by_key(|(_, b)| b.sequence.load(Ordering::Acquire))
            .map(|(i, b)| {
                b.state.store(BufferState::QueuedToPlay as u8, Ordering::Release);
                i
            })
    }

    /// Consumer-only: copies out the claimed slot's samples.
    fn take(&self, index: usize) -> [Sample; BUFFER_SAMPLES] {
        unsafe { *self.buffers[index].samples.get() }
    }

    /// Consumer-only: returns a played-out slot to the producer.
    fn release(&self, index: usize) {
        self.buffers[index]
            .state
            .store(BufferState::ToBeFilled as u8, Ordering::Release);
    }
}

/// Host-supplied audio output, fed one frame's worth of samples at a
/// time by the playback thread. Kept out of `v32-core`'s dependency-free
/// surface: the frontend's SDL2 audio device implements this, not us.
pub trait AudioSink: Send {
    fn play(&mut self, samples: &[Sample; BUFFER_SAMPLES]);
}

/// The SPU device.
pub struct Spu {
    pub bios_sound: SpuSound,
    pub cartridge_sounds: Vec<SpuSound>,
    loaded_cartridge_sounds: usize,

    pub global_volume: f32,
    pub selected_sound: i32,
    pub selected_channel: i32,

    pub channels: [SpuChannel; SPU_SOUND_CHANNELS],

    buffers: Arc<BufferRing>,
    last_frame_samples: [Sample; BUFFER_SAMPLES],
}

impl Spu {
    pub fn new() -> Self {
        Spu {
            bios_sound: SpuSound::default(),
            cartridge_sounds: (0..SPU_MAXIMUM_CARTRIDGE_SOUNDS)
                .map(|_| SpuSound::default())
                .collect(),
            loaded_cartridge_sounds: 0,
            global_volume: 1.0,
            selected_sound: -1,
            selected_channel: 0,
            channels: std::array::from_fn(|_| SpuChannel::default()),
            buffers: BufferRing::new(),
            last_frame_samples: [Sample { left: 0, right: 0 }; BUFFER_SAMPLES],
        }
    }

    fn sound(&self, index: i32) -> &SpuSound {
        if index < 0 {
            &self.bios_sound
        } else {
            &self.cartridge_sounds[index as usize]
        }
    }

    fn sound_mut(&mut self, index: i32) -> &mut SpuSound {
        if index < 0 {
            &mut self.bios_sound
        } else {
            &mut self.cartridge_sounds[index as usize]
        }
    }

    fn pointed_sound(&self) -> &SpuSound {
        self.sound(self.selected_sound)
    }

    fn pointed_sound_mut(&mut self) -> &mut SpuSound {
        self.sound_mut(self.selected_sound)
    }

    fn pointed_channel(&self) -> &SpuChannel {
        &self.channels[self.selected_channel as usize]
    }

    fn pointed_channel_mut(&mut self) -> &mut SpuChannel {
        &mut self.channels[self.selected_channel as usize]
    }

    pub fn load_bios_sound(&mut self, samples: Vec<Sample>) {
        self.bios_sound.load(samples);
    }

    pub fn unload_bios_sound(&mut self) {
        self.bios_sound.unload();
    }

    pub fn load_cartridge_sound(&mut self, index: usize, samples: Vec<Sample>) {
        self.cartridge_sounds[index].load(samples);
    }

    pub fn set_loaded_cartridge_sounds(&mut self, count: usize) {
        self.loaded_cartridge_sounds = count;
    }

    pub fn unload_cartridge_sounds(&mut self) {
        for sound in &mut self.cartridge_sounds {
            sound.unload();
        }
        self.loaded_cartridge_sounds = 0;
    }

    /// A handle to the buffer ring, for wiring up a playback thread.
    pub fn buffer_ring(&self) -> Arc<BufferRing> {
        Arc::clone(&self.buffers)
    }

    /// The mixed samples produced by the most recent `change_frame`,
    /// for frontends that feed their own audio device directly instead
    /// of (or in addition to) consuming the buffer ring.
    pub fn last_frame_samples(&self) -> &[Sample; BUFFER_SAMPLES] {
        &self.last_frame_samples
    }

    /// Spawns the thread that drains filled buffers into `sink`, pacing
    /// itself on whatever `sink.play` blocks for. Stops when the
    /// returned handle's `BufferRing` is torn down by `Console` drop.
    pub fn spawn_playback_thread(&self, mut sink: Box<dyn AudioSink>) -> JoinHandle<()> {
        let ring = Arc::clone(&self.buffers);
        std::thread::spawn(move || {
            while ring.running.load(Ordering::Acquire) {
                match ring.claim_to_play() {
                    Some(index) => {
                        let samples = ring.take(index);
                        sink.play(&samples);
                        ring.release(index);
                    }
                    None => std::thread::yield_now(),
                }
            }
        })
    }

    pub fn stop_playback_thread(&self, handle: JoinHandle<()>) {
        self.buffers.running.store(false, Ordering::Release);
        let _ = handle.join();
    }

    pub fn read_port(&mut self, local_port: u32) -> Option<Word> {
        if local_port > LAST_PORT || local_port == 0 {
            return None;
        }

        if local_port < FIRST_SOUND_PORT {
            Some(match local_port {
                1 => Word::from_float(self.global_volume),
                2 => Word::from_integer(self.selected_sound),
                3 => Word::from_integer(self.selected_channel),
                _ => unreachable!(),
            })
        } else if local_port < FIRST_CHANNEL_PORT {
            let sound = self.pointed_sound();
            Some(match local_port - FIRST_SOUND_PORT {
                0 => Word::from_integer(sound.length),
                1 => Word::from_integer(sound.play_with_loop as i32),
                2 => Word::from_integer(sound.loop_start),
                3 => Word::from_integer(sound.loop_end),
                _ => unreachable!(),
            })
        } else {
            let channel = self.pointed_channel();
            Some(match local_port - FIRST_CHANNEL_PORT {
                0 => Word::from_integer(channel.state.code()),
                1 => Word::from_integer(channel.assigned_sound),
                2 => Word::from_float(channel.volume),
                3 => Word::from_float(channel.speed),
                4 => Word::from_integer(channel.loop_enabled as i32),
                5 => Word::from_integer(channel.position as i32),
                _ => unreachable!(),
            })
        }
    }

    pub fn write_port(&mut self, local_port: u32, value: Word) -> bool {
        if local_port > LAST_PORT {
            return false;
        }

        match local_port {
            0 => {
                self.dispatch_command(value.integer());
                true
            }
            1 => {
                let v = value.float();
                if v.is_nan() || v.is_infinite() {
                    return true;
                }
                self.global_volume = clamp_f32(v, 0.0, 2.0);
                true
            }
            2 => {
                let v = value.integer();
                if v < -1 || v >= self.loaded_cartridge_sounds as i32 {
                    return true;
                }
                self.selected_sound = v;
                true
            }
            3 => {
                let v = value.integer();
                if v < 0 || v >= SPU_SOUND_CHANNELS as i32 {
                    return true;
                }
                self.selected_channel = v;
                true
            }
            4 => false, // SoundLength is read-only
            5 => {
                self.pointed_sound_mut().play_with_loop = value.integer() != 0;
                true
            }
            6 => {
                let sound = self.pointed_sound_mut();
                // `min` then `max`, not `clamp`: with an empty pointed sound
                // (`length == 0`) the upper bound is `-1`, and `i32::clamp`
                // panics when `min > max`.
                let clamped = value.integer().min(sound.length - 1).max(0);
                sound.loop_start = clamped.min(sound.loop_end);
                true
            }
            7 => {
                let sound = self.pointed_sound_mut();
                let clamped = value.integer().min(sound.length - 1).max(0);
                sound.loop_end = clamped.max(sound.loop_start);
                true
            }
            8 => false, // ChannelState is read-only
            9 => {
                let v = value.integer();
                if v < -1 || v >= self.loaded_cartridge_sounds as i32 {
                    return true;
                }
                if self.pointed_channel().state != ChannelState::Stopped {
                    return true;
                }
                self.pointed_channel_mut().assigned_sound = v;
                true
            }
            10 => {
                let v = value.float();
                if v.is_nan() || v.is_infinite() {
                    return true;
                }
                self.pointed_channel_mut().volume = clamp_f32(v, 0.0, 8.0);
                true
            }
            11 => {
                let v = value.float();
                if v.is_nan() || v.is_infinite() {
                    return true;
                }
                self.pointed_channel_mut().speed = clamp_f32(v, 0.0, 128.0);
                true
            }
            12 => {
                self.pointed_channel_mut().loop_enabled = value.integer() != 0;
                true
            }
            13 => {
                let sound_index = self.pointed_channel().assigned_sound;
                let length = self.sound(sound_index).length;
                let clamped = value.integer().min(length - 1).max(0);
                self.pointed_channel_mut().position = clamped as f64;
                true
            }
            _ => false,
        }
    }

    fn dispatch_command(&mut self, command: i32) {
        match command {
            COMMAND_PLAY_SELECTED_CHANNEL => {
                let channel = self.selected_channel as usize;
                self.play_channel(channel);
            }
            COMMAND_PAUSE_SELECTED_CHANNEL => {
                let channel = self.selected_channel as usize;
                self.pause_channel(channel);
            }
            COMMAND_STOP_SELECTED_CHANNEL => {
                let channel = self.selected_channel as usize;
                self.stop_channel(channel);
            }
            COMMAND_PAUSE_ALL_CHANNELS => self.pause_all_channels(),
            COMMAND_RESUME_ALL_CHANNELS => self.resume_all_channels(),
            COMMAND_STOP_ALL_CHANNELS => self.stop_all_channels(),
            _ => {}
        }
    }

    pub fn play_channel(&mut self, index: usize) {
        let loop_enabled = self.sound(self.channels[index].assigned_sound).play_with_loop;
        let channel = &mut self.channels[index];
        if channel.state != ChannelState::Paused {
            channel.position = 0.0;
            channel.loop_enabled = loop_enabled;
        }
        channel.state = ChannelState::Playing;
    }

    pub fn pause_channel(&mut self, index: usize) {
        self.channels[index].state = ChannelState::Paused;
    }

    pub fn stop_channel(&mut self, index: usize) {
        let channel = &mut self.channels[index];
        channel.state = ChannelState::Stopped;
        channel.position = 0.0;
    }

    pub fn pause_all_channels(&mut self) {
        for i in 0..SPU_SOUND_CHANNELS {
            if self.channels[i].state == ChannelState::Playing {
                self.pause_channel(i);
            }
        }
    }

    pub fn resume_all_channels(&mut self) {
        for i in 0..SPU_SOUND_CHANNELS {
            if self.channels[i].state == ChannelState::Paused {
                self.play_channel(i);
            }
        }
    }

    pub fn stop_all_channels(&mut self) {
        for i in 0..SPU_SOUND_CHANNELS {
            if self.channels[i].state != ChannelState::Stopped {
                self.stop_channel(i);
            }
        }
    }

    /// Produces one frame's worth (`BUFFER_SAMPLES`) of mixed stereo
    /// output, publishes it to the buffer ring for any playback thread,
    /// and keeps a copy for `last_frame_samples`. Grounded on
    /// `V32SPU::FillNextSoundBuffer`.
    pub fn change_frame(&mut self) {
        let mut mixed = [Sample { left: 0, right: 0 }; BUFFER_SAMPLES];

        {
            // Field-disjoint borrows: `channels` mutable, the sound
            // banks and volume immutable, so every channel can look up
            // its assigned sound without fighting the borrow checker
            // over a `&self` helper method.
            let Spu {
                channels,
                bios_sound,
                cartridge_sounds,
                global_volume,
                ..
            } = self;

            for sample_index in 0..BUFFER_SAMPLES {
                let mut left = 0.0f32;
                let mut right = 0.0f32;

                for channel in channels.iter_mut() {
                    if channel.state != ChannelState::Playing {
                        continue;
                    }

                    let sound: &SpuSound = if channel.assigned_sound < 0 {
                        &*bios_sound
                    } else {
                        &cartridge_sounds[channel.assigned_sound as usize]
                    };

                    let picked = sound.samples[channel.position as usize];
                    let total_volume = *global_volume * channel.volume;
                    left += total_volume * (picked.left as f32);
                    right += total_volume * (picked.right as f32);

                    let previous_position = channel.position;
                    channel.position += channel.speed as f64;

                    if channel.loop_enabled && sound.loop_end > sound.loop_start {
                        let loop_end_f = sound.loop_end as f64;
                        let loop_start_f = sound.loop_start as f64;
                        if previous_position <= loop_end_f && channel.position > loop_end_f {
                            let partial_advance =
                                (channel.position - loop_start_f).rem_euclid(loop_end_f - loop_start_f);
                            channel.position = loop_start_f + partial_advance;
                        }
                    }

                    if channel.position > (sound.length - 1) as f64 {
                        channel.state = ChannelState::Stopped;
                        channel.position = 0.0;
                    }
                }

                mixed[sample_index] = Sample {
                    left: left.clamp(i16::MIN as f32, i16::MAX as f32) as i16,
                    right: right.clamp(i16::MIN as f32, i16::MAX as f32) as i16,
                };
            }
        }

        self.last_frame_samples = mixed;
        if let Some(index) = self.buffers.find_to_fill() {
            self.buffers.fill(index, mixed);
        }
    }

    /// Stops all sound, rewinds every channel and sound's loop state,
    /// and resets the buffer ring. Grounded on `V32SPU::Reset`.
    pub fn reset(&mut self) {
        self.global_volume = 1.0;
        self.selected_sound = -1;
        self.selected_channel = 0;

        for channel in &mut self.channels {
            *channel = SpuChannel::default();
        }

        self.bios_sound.reset_loop();
        for sound in &mut self.cartridge_sounds {
            sound.reset_loop();
        }

        self.buffers.reset();
        self.last_frame_samples = [Sample { left: 0, right: 0 }; BUFFER_SAMPLES];
    }
}

impl Default for Spu {
    fn default() -> Self {
        Spu::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(left: i16, right: i16) -> Sample {
        Sample { left, right }
    }

    #[test]
    fn global_volume_rejects_nan_and_clamps_out_of_range() {
        let mut spu = Spu::new();
        assert!(spu.write_port(1, Word::from_float(f32::NAN)));
        assert_eq!(spu.global_volume, 1.0);

        spu.write_port(1, Word::from_float(10.0));
        assert_eq!(spu.global_volume, 2.0);
    }

    #[test]
    fn selecting_out_of_range_sound_is_silently_ignored() {
        let mut spu = Spu::new();
        spu.write_port(2, Word::from_integer(999_999));
        assert_eq!(spu.selected_sound, -1);
    }

    #[test]
    fn assigning_sound_to_playing_channel_is_rejected() {
        let mut spu = Spu::new();
        spu.load_cartridge_sound(0, vec![sample(1, 1); 100]);
        spu.write_port(3, Word::from_integer(0));
        spu.write_port(9, Word::from_integer(0));
        spu.play_channel(0);

        spu.write_port(9, Word::from_integer(-1));
        assert_eq!(spu.channels[0].assigned_sound, 0);
    }

    #[test]
    fn play_pause_resume_cycle_tracks_channel_state() {
        let mut spu = Spu::new();
        spu.load_cartridge_sound(0, vec![sample(1, 1); 100]);
        spu.selected_channel = 0;
        spu.write_port(9, Word::from_integer(0));

        spu.play_channel(0);
        assert_eq!(spu.channels[0].state, ChannelState::Playing);

        spu.pause_channel(0);
        assert_eq!(spu.channels[0].state, ChannelState::Paused);

        spu.resume_all_channels();
        assert_eq!(spu.channels[0].state, ChannelState::Playing);

        spu.stop_channel(0);
        assert_eq!(spu.channels[0].state, ChannelState::Stopped);
        assert_eq!(spu.channels[0].position, 0.0);
    }

    #[test]
    fn channel_auto_stops_when_sound_ends() {
        let mut spu = Spu::new();
        spu.load_cartridge_sound(0, vec![sample(1, 1); 2]);
        spu.channels[0].assigned_sound = 0;
        spu.channels[0].speed = 1.0;
        spu.play_channel(0);

        spu.change_frame();
        assert_eq!(spu.channels[0].state, ChannelState::Stopped);
    }

    #[test]
    fn looped_channel_wraps_position_with_overshoot_compensation() {
        let mut spu = Spu::new();
        spu.load_cartridge_sound(0, vec![sample(1, 1); 10]);
        spu.channels[0].assigned_sound = 0;
        spu.channels[0].loop_enabled = true;
        spu.channels[0].speed = 3.0;
        spu.cartridge_sounds[0].loop_start = 0;
        spu.cartridge_sounds[0].loop_end = 5;
        spu.channels[0].position = 4.0;
        spu.channels[0].state = ChannelState::Playing;

        spu.change_frame();
        assert!(spu.channels[0].position < 5.0);
        assert_eq!(spu.channels[0].state, ChannelState::Playing);
    }

    #[test]
    fn change_frame_publishes_a_buffer_into_the_ring() {
        let mut spu = Spu::new();
        spu.change_frame();
        let ring = spu.buffer_ring();
        assert!(ring.buffers.iter().any(|b| b.state() == BufferState::Filled));
    }

    #[test]
    fn reset_rewinds_channels_and_buffer_ring() {
        let mut spu = Spu::new();
        spu.load_cartridge_sound(0, vec![sample(1, 1); 10]);
        spu.channels[0].assigned_sound = 0;
        spu.play_channel(0);
        spu.change_frame();

        spu.reset();
        assert_eq!(spu.channels[0].state, ChannelState::Stopped);
        assert_eq!(spu.selected_sound, -1);
        let ring = spu.buffer_ring();
        // half the ring is pre-filled to seed the playback pipeline
        let filled = ring.buffers.iter().filter(|b| b.state() == BufferState::Filled).count();
        assert_eq!(filled, ring.buffers.len() / 2);
        assert!(ring
            .buffers
            .iter()
            .all(|b| matches!(b.state(), BufferState::ToBeFilled | BufferState::Filled)));
    }

    /// With no BIOS sound loaded and nothing selected (`selected_sound ==
    /// -1`, the default), the pointed sound is the empty BIOS sound
    /// (`length == 0`); writing LoopStart must not panic.
    #[test]
    fn loop_start_write_on_empty_pointed_sound_does_not_panic() {
        let mut spu = Spu::new();
        assert!(spu.write_port(6, Word::from_integer(5)));
        assert_eq!(spu.bios_sound.loop_start, 0);
    }

    #[test]
    fn loop_end_write_on_empty_pointed_sound_does_not_panic() {
        let mut spu = Spu::new();
        assert!(spu.write_port(7, Word::from_integer(5)));
        assert_eq!(spu.bios_sound.loop_end, 0);
    }

    /// Selecting a channel and writing its position with no sound ever
    /// assigned (`assigned_sound == -1` default, empty BIOS sound) must
    /// not panic either.
    #[test]
    fn channel_position_write_with_no_assigned_sound_does_not_panic() {
        let mut spu = Spu::new();
        spu.write_port(3, Word::from_integer(0));
        assert!(spu.write_port(13, Word::from_integer(5)));
        assert_eq!(spu.channels[0].position, 0.0);
    }
}
