// main.rs — 桌面演示宿主：窗口、事件分发、控制栏
//
// Usage: pano_player [--config options.json] [--lang en] [--duration 30] [image]

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod host;
mod notice;
mod renderer;

use host::DesktopHost;
use notice::NoticeWidget;
use pano_player::{
    i18n, HostEvent, PanoOptions, PanoPlayer, Platform, PlayerHost, Point, ReturnButtonStyle,
    WheelAxis, WheelEvent,
};
use renderer::Renderer;

use anyhow::Context as _;
use log::{error, info, trace, warn};
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use image::io::Reader as ImageReader;
use image::GenericImageView;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

const DEFAULT_DURATION_SECS: f32 = 30.0;

struct Args {
    config: Option<PathBuf>,
    duration: f32,
    image: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { config: None, duration: DEFAULT_DURATION_SECS, image: None };
    let mut it = std::env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            "--duration" => {
                let v = it.next().context("--duration needs a value")?;
                args.duration = v.parse().with_context(|| format!("bad duration {:?}", v))?;
            }
            // consumed by i18n::resolve_lang_from_args
            "--lang" => {
                it.next();
            }
            _ => args.image = Some(a.into()),
        }
    }
    Ok(args)
}

/// Clicks collected while the control bar is drawn, applied afterwards.
enum UiAction {
    TogglePlay,
    ToggleAutoReturn,
    BackToDefault,
    ToggleFullscreen,
    Open(PathBuf),
}

/// The host only forwards events the player subscribed to.
fn dispatch(player: &mut PanoPlayer, host: &mut DesktopHost, event: HostEvent) {
    if host.wants(event) {
        player.handle(host, event);
    }
}

fn toggle_fullscreen(player: &mut PanoPlayer, host: &mut DesktopHost) {
    if host.wants(HostEvent::FullscreenTap) {
        dispatch(player, host, HostEvent::FullscreenTap);
    } else {
        let event = host.toggle_fullscreen();
        dispatch(player, host, event);
    }
}

fn toggle_play(player: &mut PanoPlayer, host: &mut DesktopHost) {
    if host.playback.playing {
        host.pause();
    } else {
        let event = host.play();
        dispatch(player, host, event);
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&i18n::tr("file.filter.images"), &["jpg", "jpeg", "png", "bmp"])
        .pick_file()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // i18n
    i18n::init(i18n::resolve_lang_from_args());
    if let Some(lang) = i18n::current_lang() {
        info!("ui language: {}", lang);
    }
    let args = parse_args()?;
    let options = match &args.config {
        Some(path) => PanoOptions::from_file(path)?,
        None => PanoOptions::default(),
    };

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let platform = Platform {
        accelerated_3d: renderer.is_accelerated() && std::env::var_os("PANO_FORCE_FLAT").is_none(),
        ..Platform::default()
    };

    let mut host = DesktopHost::new(window.clone(), args.duration);
    let mut player =
        PanoPlayer::new(&options, platform)?.with_callback(|| info!("panorama initialized"));
    player.on_player_ready(&mut host);

    let mut notice = NoticeWidget::default();
    let mut cursor: Option<Point> = None;
    let mut touches: Vec<(u64, Point)> = Vec::new();
    let mut is_loading = false;

    // 异步加载通道
    let (tx, rx): (Sender<image::RgbaImage>, Receiver<image::RgbaImage>) = channel();
    if let Some(path) = args.image.clone() {
        is_loading = true;
        start_load_image(path, tx.clone());
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        // 检查是否有新加载的图片
        if let Ok(rgba) = rx.try_recv() {
            renderer.load_frame(rgba);
            is_loading = false;
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    if let WindowEvent::MouseInput { state: ElementState::Released, .. } = event {
                        player.pointer_up();
                    }
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        player.dispose(&mut host);
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        dispatch(&mut player, &mut host, HostEvent::Resize);
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(*new_inner_size);
                        dispatch(&mut player, &mut host, HostEvent::Resize);
                    }

                    WindowEvent::CursorEntered { .. } => {
                        dispatch(&mut player, &mut host, HostEvent::MouseEnter);
                    }

                    WindowEvent::CursorLeft { .. } => {
                        cursor = None;
                        dispatch(&mut player, &mut host, HostEvent::MouseLeave);
                    }

                    // 键盘快捷键
                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_image() {
                                        is_loading = true;
                                        start_load_image(path, tx.clone());
                                    }
                                }
                                Some(VirtualKeyCode::Space) => toggle_play(&mut player, &mut host),
                                Some(VirtualKeyCode::F11) => {
                                    toggle_fullscreen(&mut player, &mut host)
                                }
                                Some(VirtualKeyCode::R) => {
                                    player.back_to_default();
                                }
                                _ => {}
                            }
                        }
                    }

                    // 鼠标交互
                    WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                        match state {
                            ElementState::Pressed => player.pointer_down(&host, cursor),
                            ElementState::Released => player.pointer_up(),
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = Point::from_coords(Some(position.x as f32), Some(position.y as f32));
                        player.pointer_move(cursor);
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let wheel = match delta {
                            MouseScrollDelta::LineDelta(x, y) if y == 0.0 && x != 0.0 => WheelEvent {
                                axis: Some(WheelAxis::Horizontal),
                                ..WheelEvent::default()
                            },
                            MouseScrollDelta::LineDelta(_, y) => WheelEvent::from_delta_y(y * 120.0),
                            MouseScrollDelta::PixelDelta(pos) => {
                                WheelEvent::from_delta_y(pos.y as f32)
                            }
                        };
                        player.wheel(&wheel);
                    }

                    WindowEvent::Touch(touch) => {
                        let pos = Point::new(touch.location.x as f32, touch.location.y as f32);
                        match touch.phase {
                            TouchPhase::Started => {
                                touches.push((touch.id, pos));
                                let points: Vec<Point> = touches.iter().map(|t| t.1).collect();
                                player.touch_start(&host, &points);
                            }
                            TouchPhase::Moved => {
                                if let Some(t) = touches.iter_mut().find(|t| t.0 == touch.id) {
                                    t.1 = pos;
                                }
                                let points: Vec<Point> = touches.iter().map(|t| t.1).collect();
                                player.touch_move(&points);
                            }
                            TouchPhase::Ended | TouchPhase::Cancelled => {
                                touches.retain(|t| t.0 != touch.id);
                                let points: Vec<Point> = touches.iter().map(|t| t.1).collect();
                                player.touch_end(&points);
                            }
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        is_loading = true;
                        start_load_image(path, tx.clone());
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                if let Some(event) = host.advance() {
                    dispatch(&mut player, &mut host, event);
                }

                let aspect = player.canvas().map(|c| c.aspect()).unwrap_or(1.0);
                if let Some(handle) = host.take_due_frame() {
                    player.on_frame(&mut host, handle, |view| renderer.update_camera(view, aspect));
                }
                for event in player.take_events() {
                    trace!("pano event: {:?}", event);
                }

                // 没有 3D 画布时按普通视频平铺播放
                let draw_scene = match player.canvas() {
                    Some(canvas) => canvas.visible,
                    None => {
                        renderer.show_flat();
                        host.playback.has_started
                    }
                };

                let mut actions = Vec::new();
                let render_result = renderer.render_with_ui(&window, draw_scene, |ctx| {
                    draw_ui(ctx, &player, &host, &mut notice, is_loading, &mut actions);
                });

                for action in actions {
                    match action {
                        UiAction::TogglePlay => toggle_play(&mut player, &mut host),
                        UiAction::ToggleAutoReturn => player.click_return_button(),
                        UiAction::BackToDefault => {
                            player.back_to_default();
                        }
                        UiAction::ToggleFullscreen => toggle_fullscreen(&mut player, &mut host),
                        UiAction::Open(path) => {
                            is_loading = true;
                            start_load_image(path, tx.clone());
                        }
                    }
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => warn!("render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn start_load_image(path: PathBuf, tx: Sender<image::RgbaImage>) {
    thread::spawn(move || {
        info!("{}", i18n::tr_with("log.loading_image_bg", &[("path", format!("{:?}", path))]));

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                error!("{}", i18n::tr_with("error.open_file", &[("err", e.to_string())]));
                return;
            }
        };
        let reader = BufReader::new(file);

        let img_result = ImageReader::new(reader)
            .with_guessed_format()
            .map_err(image::ImageError::IoError)
            .and_then(|mut r| {
                r.no_limits();
                r.decode()
            });

        match img_result {
            Ok(img) => {
                let (w, h) = img.dimensions();
                info!(
                    "{}",
                    i18n::tr_with("log.image_loaded_size", &[("w", w.to_string()), ("h", h.to_string())])
                );

                if tx.send(img.to_rgba8()).is_err() {
                    error!("{}", i18n::tr("error.send_to_main_failed"));
                }
            }
            Err(e) => error!("{}", i18n::tr_with("error.decode_image", &[("err", e.to_string())])),
        }
    });
}

fn format_time(secs: f32) -> String {
    let secs = secs.max(0.0) as u32;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn draw_ui(
    ctx: &egui::Context,
    player: &PanoPlayer,
    host: &DesktopHost,
    notice: &mut NoticeWidget,
    is_loading: bool,
    actions: &mut Vec<UiAction>,
) {
    egui::TopBottomPanel::bottom("control_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let playback = &host.playback;
            let play_label = if playback.ended {
                i18n::tr("control.replay")
            } else if playback.playing {
                i18n::tr("control.pause")
            } else {
                i18n::tr("control.play")
            };
            if ui.button(play_label).clicked() {
                actions.push(UiAction::TogglePlay);
            }

            ui.label(format!(
                "{} / {}",
                format_time(playback.position),
                format_time(playback.duration)
            ));
            ui.separator();

            if let Some(button) = player.return_button() {
                let text = match button.style() {
                    ReturnButtonStyle::Off => egui::RichText::new("⟲").color(egui::Color32::LIGHT_GREEN),
                    ReturnButtonStyle::On => egui::RichText::new("⟲").color(egui::Color32::GRAY),
                };
                if ui.button(text).on_hover_text(button.title()).clicked() {
                    actions.push(UiAction::ToggleAutoReturn);
                }
                if ui
                    .add_enabled(
                        !player.is_default_position(),
                        egui::Button::new(i18n::tr("control.back_to_default")),
                    )
                    .clicked()
                {
                    actions.push(UiAction::BackToDefault);
                }
                ui.separator();
            }

            let fullscreen_label = if host.is_fullscreen() {
                i18n::tr("control.fullscreen.exit")
            } else {
                i18n::tr("control.fullscreen.enter")
            };
            if ui.button(fullscreen_label).clicked() {
                actions.push(UiAction::ToggleFullscreen);
            }
            if ui.button(i18n::tr("control.open")).clicked() {
                if let Some(path) = pick_image() {
                    actions.push(UiAction::Open(path));
                }
            }

            if is_loading {
                ui.separator();
                ui.label(egui::RichText::new(i18n::tr("status.loading")).color(egui::Color32::YELLOW));
            }

            if player.canvas().is_some() {
                let current = player.current();
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "Lat: {:.1}° | Lon: {:.1}° | FOV: {:.1}°",
                        current.lat, current.lon, current.fov
                    ));
                });
            }
        });
    });

    notice.draw(ctx, player.notice());
}
