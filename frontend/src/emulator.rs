use std::sync::atomic::Ordering;
use std::thread;

use gigatron_core::system::GigatronSystem;
use sdl2::event::Event;
use sdl2::keyboard::Scancode;

use crate::audio;
use crate::input::KeyMap;
use crate::video::Video;

/// Generous tick budget per frame: nominal is ~104,166 cycles at 60 Hz on a
/// 6.25 MHz clock, but a frame that never toggles VSYNC (e.g. a halted
/// program) must not spin forever.
const MAX_TICKS_PER_FRAME: u32 = 200_000;

pub fn run(system: &mut GigatronSystem, key_map: &KeyMap, scale: u32) {
    let sdl_context = sdl2::init().expect("Failed to initialize SDL2");
    let sdl_video = sdl_context.video().expect("Failed to init SDL video");
    let sdl_audio = sdl_context.audio().expect("Failed to init SDL audio");

    let (width, height) = system.display_size();
    let mut video = Video::new(&sdl_video, "Gigatron", width, height, scale);
    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    let buffer_size = (width * height * 4) as usize;
    let mut framebuffer = vec![0u8; buffer_size];
    let mut audio_scratch = [0.0f32; 4096];

    let audio_device = audio::init(&sdl_audio, 44_100);

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => break 'main,

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some(bit) = key_map.get(sc) {
                        system.set_input(bit, true);
                    }
                }

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if let Some(bit) = key_map.get(sc) {
                        system.set_input(bit, false);
                    }
                }

                _ => {}
            }
        }

        system.run_frame(MAX_TICKS_PER_FRAME);

        system.render_frame(&mut framebuffer);
        video.present(&framebuffer);

        if let Some((device, ring, _)) = &audio_device {
            let n = system.read_audio_samples(&mut audio_scratch);
            if n > 0 {
                let mut buf = ring.lock().unwrap();
                buf.extend(audio_scratch[..n].iter().copied());
                drop(buf);
                if device.status() == sdl2::audio::AudioStatus::Paused {
                    device.resume();
                }
            }
        }
    }

    if let Some((device, _, fading_out)) = &audio_device {
        fading_out.store(true, Ordering::Relaxed);
        thread::sleep(audio::fade_out_duration());
        device.pause();
    }
}
