use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

/// Palette and metrics shared by the playground chrome and the preview
/// canvas.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Behind every panel.
    pub backdrop: Color32,
    /// Side panels and notices.
    pub chrome: Color32,
    /// Cards, chat bubbles and the composer.
    pub raised: Color32,
    /// Nested surfaces inside a preview, such as a `Box`.
    pub inset: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub ink: Color32,
    pub ink_muted: Color32,
    pub ink_on_accent: Color32,
    pub hairline: Color32,
    pub space_xs: i8,
    pub space_s: i8,
    pub space_m: i8,
    pub space_l: i8,
    pub corner_s: u8,
    pub corner_pill: u8,
    pub corner_l: u8,
    pub control_height: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            backdrop: Color32::from_rgb(0x12, 0x12, 0x1A),
            chrome: Color32::from_rgb(0x19, 0x19, 0x24),
            raised: Color32::from_rgb(0x22, 0x22, 0x30),
            inset: Color32::from_rgb(0x2C, 0x2C, 0x3D),
            accent: Color32::from_rgb(0x8B, 0x5C, 0xF6),
            accent_soft: Color32::from_rgb(0x6D, 0x46, 0xC9),
            success: Color32::from_rgb(0x34, 0xD3, 0x99),
            warning: Color32::from_rgb(0xFB, 0xBF, 0x24),
            danger: Color32::from_rgb(0xF8, 0x71, 0x71),
            ink: Color32::from_rgb(0xEC, 0xEA, 0xF4),
            ink_muted: Color32::from_rgb(0x9A, 0x97, 0xAE),
            ink_on_accent: Color32::WHITE,
            hairline: Color32::from_rgba_premultiplied(0x30, 0x2C, 0x48, 40),
            space_xs: 4,
            space_s: 8,
            space_m: 12,
            space_l: 16,
            corner_s: 6,
            corner_pill: 10,
            corner_l: 10,
            control_height: 32.0,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.chrome;
        visuals.window_fill = self.chrome;
        visuals.extreme_bg_color = self.backdrop;
        visuals.override_text_color = Some(self.ink);
        visuals.hyperlink_color = self.accent;
        visuals.selection.bg_fill = self.accent_soft;
        visuals.selection.stroke = Stroke::new(1.0, self.ink_on_accent);
        visuals.window_stroke = self.hairline_stroke();
        visuals.window_corner_radius = CornerRadius::same(self.corner_l);

        let widgets = &mut visuals.widgets;
        for (state, fill) in [
            (&mut widgets.noninteractive, self.raised),
            (&mut widgets.inactive, self.raised),
            (&mut widgets.hovered, self.inset),
            (&mut widgets.active, self.accent_soft),
            (&mut widgets.open, self.inset),
        ] {
            state.bg_fill = fill;
            state.weak_bg_fill = fill;
            state.bg_stroke = Stroke::NONE;
            state.fg_stroke.color = self.ink;
            state.corner_radius = CornerRadius::same(self.corner_s);
        }

        ctx.style_mut(|style| {
            style.visuals = visuals;
            style.spacing.item_spacing = egui::vec2(8.0, 8.0);
            style.spacing.button_padding = egui::vec2(10.0, 6.0);
            style.text_styles.insert(TextStyle::Heading, FontId::proportional(18.0));
            style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
            // Prop JSON in the preview inspector.
            style.text_styles.insert(TextStyle::Monospace, FontId::monospace(12.5));
            style.text_styles.insert(TextStyle::Small, FontId::proportional(11.5));
        });
    }

    pub fn panel_frame(&self, fill: Color32, inner_padding: i8) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(inner_padding))
            .corner_radius(CornerRadius::same(self.corner_l))
            .stroke(self.hairline_stroke())
    }

    pub fn card_frame(&self) -> Frame {
        self.panel_frame(self.raised, self.space_m).shadow(egui::epaint::Shadow {
            offset: [0, 2],
            blur: 10,
            spread: 0,
            color: Color32::from_black_alpha(48),
        })
    }

    pub fn composer_frame(&self) -> Frame {
        Frame::new()
            .fill(self.raised)
            .inner_margin(Margin::symmetric(self.space_m, self.space_s))
            .corner_radius(CornerRadius::same(self.corner_l))
            .stroke(Stroke::new(1.0, self.accent_soft))
    }

    pub fn hairline_stroke(&self) -> Stroke {
        Stroke::new(1.0, self.hairline)
    }

    /// Colour for a design-system variant or severity name such as
    /// `"error"` or `"success"`. Unknown names fall back to the accent.
    pub fn tone(&self, variant: &str) -> Color32 {
        match variant {
            "success" | "positive" | "green" => self.success,
            "warning" | "caution" | "yellow" => self.warning,
            "error" | "danger" | "destructive" | "red" => self.danger,
            "secondary" | "neutral" | "outline" | "muted" | "gray" => self.ink_muted,
            _ => self.accent,
        }
    }

    /// Frame for a placeholder or fault box in the preview canvas.
    pub fn notice_frame(&self, stroke: Color32) -> Frame {
        Frame::new()
            .fill(self.chrome)
            .inner_margin(Margin::symmetric(self.space_s, self.space_xs))
            .corner_radius(CornerRadius::same(self.corner_s))
            .stroke(Stroke::new(1.0, stroke))
    }
}
