//! SDL2 audio output device. Implements `v32_core::device::spu::AudioSink`
//! so `Spu::spawn_playback_thread` can drain the buffer ring straight into
//! an SDL2 audio queue, with a short fade-in at startup to avoid an
//! audible click on the first buffer.

use sdl2::audio::{AudioQueue, AudioSpecDesired};
use v32_core::constants::{BUFFER_SAMPLES, SPU_SAMPLING_RATE};
use v32_core::device::spu::AudioSink;
use v32_core::word::Sample;

/// Number of samples over which to fade in at startup (~5.8 ms at 44.1 kHz).
const FADE_SAMPLES: u32 = 256;

pub struct SdlAudioSink {
    queue: AudioQueue<i16>,
    fade_in_pos: u32,
    interleaved: Vec<i16>,
}

impl SdlAudioSink {
    pub fn new(sdl_audio: &sdl2::AudioSubsystem) -> Self {
        let desired_spec = AudioSpecDesired {
            freq: Some(SPU_SAMPLING_RATE as i32),
            channels: Some(2),
            samples: Some(BUFFER_SAMPLES as u16),
        };

        let queue: AudioQueue<i16> = sdl_audio
            .open_queue(None, &desired_spec)
            .expect("Failed to open SDL audio device");
        queue.resume();

        Self {
            queue,
            fade_in_pos: 0,
            interleaved: Vec::with_capacity(BUFFER_SAMPLES * 2),
        }
    }
}

impl AudioSink for SdlAudioSink {
    fn play(&mut self, samples: &[Sample; BUFFER_SAMPLES]) {
        self.interleaved.clear();
        for sample in samples {
            let (left, right) = if self.fade_in_pos < FADE_SAMPLES {
                let gain = self.fade_in_pos as f32 / FADE_SAMPLES as f32;
                self.fade_in_pos += 1;
                (
                    (sample.left as f32 * gain) as i16,
                    (sample.right as f32 * gain) as i16,
                )
            } else {
                (sample.left, sample.right)
            };
            self.interleaved.push(left);
            self.interleaved.push(right);
        }

        // Back off if the host is consuming slower than we're producing,
        // so playback doesn't accumulate unbounded latency.
        while self.queue.size() as usize > BUFFER_SAMPLES * 2 * 4 {
            std::thread::yield_now();
        }

        let _ = self.queue.queue_audio(&self.interleaved);
    }
}
