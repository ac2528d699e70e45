// src/i18n.rs
//
// Runtime message catalog for the notices and control-bar labels:
// - Strings live in either:
//   A) assets/i18n/<lang>.json
//   B) assets/i18n.json (single file, format: { "<lang>": { "key": "value" } })
// - Load order: selected lang -> built-in English table
// - Lookup: tr("key") / tr_with("key", [("name", "...")]) with {name} placeholders
//
// Language selection:
// - CLI: --lang <code>
// - Env: PANO_LANG
// - Default: en

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

const BUILTIN: &[(&str, &str)] = &[
    ("app.title", "Pano Player"),
    ("notice.drag_and_drop", "Please drag and drop the video"),
    ("notice.webgl_error", "Your graphics adapter does not support accelerated 3D rendering."),
    ("notice.played_flat", "Your video will be played as a normal video."),
    ("return_button.turn_off", "Auto-Return Off"),
    ("return_button.turn_on", "Auto-Return On"),
    ("control.play", "Play"),
    ("control.pause", "Pause"),
    ("control.replay", "Replay"),
    ("control.back_to_default", "Back to default"),
    ("control.fullscreen.enter", "Fullscreen"),
    ("control.fullscreen.exit", "Exit fullscreen"),
    ("control.open", "Open…"),
    ("file.filter.images", "Images"),
    ("status.loading", "Loading…"),
    ("error.open_file", "Failed to open file: {err}"),
    ("error.decode_image", "Failed to decode image: {err}"),
    ("error.send_to_main_failed", "Failed to send decoded image to main thread"),
    ("log.loading_image_bg", "Loading image in background: {path}"),
    ("log.image_loaded_size", "Image loaded, size: {w}x{h}"),
    ("gpu.image_too_large_scaled", "Image {src_w}x{src_h} exceeds GPU limit {max}, scaled to {new_w}x{new_h}"),
];

#[derive(Debug, Clone)]
pub struct I18n {
    lang: String,
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn builtin_map() -> HashMap<String, String> {
    BUILTIN
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn load_json_map(path: &Path) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn load_multi_lang_json(path: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    let all: HashMap<String, HashMap<String, String>> = serde_json::from_str(&text).ok()?;
    all.get(lang).cloned()
}

/// Search `<exe_dir>/assets/<rel>` first, then `./assets/<rel>`.
fn find_asset(rel: &Path) -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join(rel);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join(rel);
    p.exists().then_some(p)
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let per_lang = Path::new("i18n").join(format!("{}.json", lang));
    if let Some(m) = find_asset(&per_lang).and_then(|p| load_json_map(&p)) {
        return m;
    }

    if let Some(m) = find_asset(Path::new("i18n.json")).and_then(|p| load_multi_lang_json(&p, lang)) {
        return m;
    }

    HashMap::new()
}

/// Initialize global i18n. Safe to call multiple times; later calls overwrite current lang maps.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let i = I18n {
        map: load_lang(&lang),
        lang,
        fallback_map: builtin_map(),
    };

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

/// Language the catalog was last initialized with, `None` before `init`.
pub fn current_lang() -> Option<String> {
    I18N.get().and_then(|l| l.read().ok()).map(|i| i.lang.clone())
}

/// Get localized text by key: selected language, then the built-in table,
/// then the key itself.
pub fn tr(key: &str) -> String {
    if let Some(i) = I18N.get().and_then(|l| l.read().ok()) {
        if let Some(v) = i.map.get(key).or_else(|| i.fallback_map.get(key)) {
            return v.clone();
        }
        return key.to_string();
    }

    BUILTIN
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        let placeholder = format!("{{{}}}", k);
        s = s.replace(&placeholder, v);
    }
    s
}

/// Choose language from CLI/env.
pub fn resolve_lang_from_args() -> String {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    if let Ok(v) = std::env::var("PANO_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    "en".to_string()
}
