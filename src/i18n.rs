use crate::formats::{Language, Theme};

/// User-facing strings for one language.
#[derive(Debug)]
pub struct Labels {
    pub loading: &'static str,
    pub load_failed: &'static str,
    pub empty_title: &'static str,
    pub empty_body: &'static str,
    pub empty_cta: &'static str,
    pub on_this_page: &'static str,
    pub previous: &'static str,
    pub next: &'static str,
    pub last_updated: &'static str,
    pub translation_missing: &'static str,
    pub open_menu: &'static str,
    pub close_menu: &'static str,
    theme_light: &'static str,
    theme_dark: &'static str,
}

impl Labels {
    /// Label of the theme toggle: names the theme it switches *to*.
    pub fn theme_toggle(&self, current: Theme) -> &'static str {
        match current {
            Theme::Dark => self.theme_light,
            Theme::Light => self.theme_dark,
        }
    }
}

static ID: Labels = Labels {
    loading: "Memuat dokumentasi...",
    load_failed: "Gagal memuat dokumentasi.",
    empty_title: "Belum ada dokumentasi",
    empty_body: "Tambahkan konten melalui Admin Panel CMS.",
    empty_cta: "Buka Admin Panel →",
    on_this_page: "Isi Halaman",
    previous: "← Sebelumnya",
    next: "Selanjutnya →",
    last_updated: "Terakhir diperbarui",
    translation_missing: "Halaman ini belum tersedia dalam bahasa ini. Menampilkan halaman pertama.",
    open_menu: "Buka menu",
    close_menu: "Tutup menu",
    theme_light: "Terang",
    theme_dark: "Gelap",
};

static EN: Labels = Labels {
    loading: "Loading documentation...",
    load_failed: "Failed to load documentation.",
    empty_title: "No documentation yet",
    empty_body: "Add content via the CMS Admin Panel.",
    empty_cta: "Open Admin Panel →",
    on_this_page: "On this page",
    previous: "← Previous",
    next: "Next →",
    last_updated: "Last updated",
    translation_missing: "This page is not available in this language yet. Showing the first page.",
    open_menu: "Open menu",
    close_menu: "Close menu",
    theme_light: "Light",
    theme_dark: "Dark",
};

pub fn labels(language: Language) -> &'static Labels {
    match language {
        Language::Id => &ID,
        Language::En => &EN,
    }
}
