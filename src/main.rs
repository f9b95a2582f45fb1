use chatflow_builder::config_panel;
use chatflow_builder::editor::style::EditorStyle;
use chatflow_builder::editor::FlowEditor;
use chatflow_builder::history::UndoStack;
use chatflow_builder::notifications::{NoticeLevel, Notifications};
use chatflow_builder::palette;
use chatflow_builder::persistence;
use chatflow_builder::settings::{AppSettings, SETTINGS_FILE};
use chatflow_builder::store::FlowStore;
use chatflow_builder::validation::{check_flow, Severity};
use eframe::egui;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chatflow Builder",
        native_options,
        Box::new(|_cc| Ok(Box::new(FlowBuilderApp::new(AppSettings::load(Path::new(SETTINGS_FILE)))))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the UI: {}", e))
}

struct FlowBuilderApp {
    store: FlowStore,
    editor: FlowEditor,
    undo_stack: UndoStack,
    settings: AppSettings,
    notifications: Notifications,
    flow_name: String,
    show_load_window: bool,
    show_style_window: bool,
    available_flows: Vec<String>,
}

impl FlowBuilderApp {
    fn new(settings: AppSettings) -> Self {
        let mut editor = FlowEditor::default();
        editor.style = settings.style.clone();
        editor.snap_to_grid = settings.snap_to_grid;
        editor.grid_size = settings.grid_size;

        let mut notifications = Notifications::default();
        let mut flow_name = "untitled".to_string();
        let mut store = FlowStore::seeded();

        // Auto-load last flow
        if let Some(last) = settings.last_flow_name.clone() {
            match persistence::load_flow(&settings.flows_dir, &last) {
                Ok(doc) => {
                    store = FlowStore::new(doc);
                    notifications.info(format!("Auto-loaded last flow: {}", last));
                    flow_name = last;
                }
                Err(e) => notifications.warn(format!("Could not reopen {}: {}", last, e)),
            }
        }

        let undo_stack = UndoStack::new(store.document(), settings.history_max_records);
        Self {
            store,
            editor,
            undo_stack,
            settings,
            notifications,
            flow_name,
            show_load_window: false,
            show_style_window: false,
            available_flows: Vec::new(),
        }
    }

    fn snapshot(&mut self) {
        self.undo_stack.push(self.store.document());
    }

    fn undo(&mut self) {
        if let Some(prev) = self.undo_stack.undo() {
            self.store.restore(prev);
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.undo_stack.redo() {
            self.store.restore(next);
        }
    }

    fn save_settings(&mut self) {
        self.settings.style = self.editor.style.clone();
        self.settings.snap_to_grid = self.editor.snap_to_grid;
        self.settings.grid_size = self.editor.grid_size;
        if let Err(e) = self.settings.save(Path::new(SETTINGS_FILE)) {
            self.notifications.error(format!("Settings not saved: {}", e));
        }
    }

    fn new_flow(&mut self) {
        self.store = FlowStore::seeded();
        self.flow_name = "untitled".to_string();
        self.undo_stack = UndoStack::new(self.store.document(), self.settings.history_max_records);
        self.notifications.info("New flow created.");
    }

    fn save_flow(&mut self) {
        match persistence::save_flow(&self.settings.flows_dir, &self.flow_name, self.store.document()) {
            Ok(path) => {
                self.settings.last_flow_name = Some(self.flow_name.trim().trim_end_matches(".json").to_string());
                self.save_settings();
                self.notifications
                    .success(format!("Flow saved to {}", path.display()));
            }
            Err(e) => self.notifications.error(format!("Save failed: {}", e)),
        }
    }

    fn load_flow(&mut self, name: &str) {
        match persistence::load_flow(&self.settings.flows_dir, name) {
            Ok(doc) => {
                self.store.replace_document(doc);
                self.flow_name = name.to_string();
                self.undo_stack = UndoStack::new(self.store.document(), self.settings.history_max_records);
                self.settings.last_flow_name = Some(name.to_string());
                self.save_settings();
                self.notifications.info(format!("Loaded {}", name));
                self.show_load_window = false;
            }
            Err(e) => self.notifications.error(format!("Load failed: {}", e)),
        }
    }

    fn refresh_flow_list(&mut self) {
        match persistence::list_flows(&self.settings.flows_dir) {
            Ok(names) => self.available_flows = names,
            Err(e) => {
                self.available_flows.clear();
                self.notifications.error(format!("Could not list flows: {}", e));
            }
        }
    }

    fn export_to_clipboard(&mut self, ctx: &egui::Context) {
        match persistence::to_json(self.store.document()) {
            Ok(json) => {
                ctx.copy_text(json);
                self.notifications.success("Flow JSON copied to clipboard");
            }
            Err(e) => self.notifications.error(format!("Export failed: {}", e)),
        }
    }

    fn test_flow(&mut self) {
        let issues = check_flow(self.store.document());
        if issues.is_empty() {
            self.notifications.success("Flow check passed: no issues found");
            return;
        }
        for issue in &issues {
            let level = match issue.severity() {
                Severity::Error => NoticeLevel::Error,
                Severity::Warning => NoticeLevel::Warning,
            };
            self.notifications.push(level, issue.to_string());
        }
    }

    fn publish_flow(&mut self) {
        match persistence::to_json(self.store.document()) {
            Ok(json) => {
                log::debug!("Publish payload is {} bytes", json.len());
                self.notifications
                    .warn("Publish: not connected to a backend, nothing was sent");
            }
            Err(e) => self.notifications.error(format!("Publish failed: {}", e)),
        }
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Chatflow Builder");
                ui.separator();

                ui.label("Flow:");
                ui.horizontal(|ui| {
                    ui.set_min_width(100.0);
                    ui.set_max_width(150.0);
                    ui.text_edit_singleline(&mut self.flow_name);
                });
                if ui.button("New").clicked() {
                    self.new_flow();
                }
                if ui.button("Save").clicked() {
                    self.save_flow();
                }
                if ui.button("Load").clicked() {
                    self.refresh_flow_list();
                    self.show_load_window = true;
                }
                if ui.button("Export").on_hover_text("Copy JSON to clipboard").clicked() {
                    self.export_to_clipboard(ctx);
                }
                ui.separator();

                if ui
                    .add_enabled(self.undo_stack.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    self.undo();
                }
                if ui
                    .add_enabled(self.undo_stack.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    self.redo();
                }
                if ui.button("Center").clicked() {
                    self.editor.center_view(&mut self.store);
                }
                if ui.checkbox(&mut self.editor.snap_to_grid, "Snap").changed() {
                    self.save_settings();
                }
                if ui.button("Style").clicked() {
                    self.show_style_window = !self.show_style_window;
                }
                ui.separator();

                if ui.button("▶ Test").clicked() {
                    self.test_flow();
                }
                if ui.button("Publish").clicked() {
                    self.publish_flow();
                }
            });
        });
    }

    fn load_window_ui(&mut self, ctx: &egui::Context) {
        let mut open = self.show_load_window;
        let mut to_load = None;
        let mut to_delete = None;

        egui::Window::new("Load Flow").open(&mut open).show(ctx, |ui| {
            if self.available_flows.is_empty() {
                ui.label(format!("No flows in {}", self.settings.flows_dir.display()));
            }
            for name in &self.available_flows {
                ui.horizontal(|ui| {
                    if ui.button("🗑").on_hover_text("Delete Flow").clicked() {
                        to_delete = Some(name.clone());
                    }
                    if ui.button(name).clicked() {
                        to_load = Some(name.clone());
                    }
                });
            }
        });
        self.show_load_window = open;

        if let Some(name) = to_delete {
            match persistence::delete_flow(&self.settings.flows_dir, &name) {
                Ok(()) => self.notifications.info(format!("Deleted {}", name)),
                Err(e) => self.notifications.error(format!("Delete failed: {}", e)),
            }
            self.refresh_flow_list();
        }
        if let Some(name) = to_load {
            self.load_flow(&name);
        }
    }

    fn style_window_ui(&mut self, ctx: &egui::Context) {
        let mut open = self.show_style_window;
        let mut should_save = false;
        let mut should_reset = false;

        egui::Window::new("🎨 Style Settings")
            .open(&mut open)
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.heading("Display Settings");
                ui.horizontal(|ui| {
                    ui.label("Font Size:");
                    ui.add(egui::Slider::new(&mut self.editor.style.font_size, 8.0..=24.0).suffix("px"));
                });
                ui.horizontal(|ui| {
                    ui.label("Grid:");
                    ui.add(egui::Slider::new(&mut self.editor.grid_size, 5.0..=80.0).suffix("px"));
                });
                ui.checkbox(&mut self.editor.style.use_gradient_connections, "Gradient Connections");
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgba(&mut self.editor.style.edge_color);
                    ui.label("Edge");
                });
                ui.separator();

                ui.heading("Node Header Colors");
                let mut categories: Vec<String> = self.editor.style.header_colors.keys().cloned().collect();
                categories.sort();
                for category in categories {
                    if let Some(color) = self.editor.style.header_colors.get_mut(&category) {
                        ui.horizontal(|ui| {
                            ui.color_edit_button_srgba(color);
                            ui.label(&category);
                        });
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        should_save = true;
                    }
                    if ui.button("🔄 Reset to Defaults").clicked() {
                        should_reset = true;
                    }
                });
            });
        self.show_style_window = open;

        if should_reset {
            self.editor.style = EditorStyle::default();
        }
        if should_save || should_reset {
            self.save_settings();
            self.notifications.info(if should_reset {
                "Style reset to defaults"
            } else {
                "Style settings saved"
            });
        }
    }

    fn show_log_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.strong("Output Log");
                    if ui.button("Clear").clicked() {
                        self.notifications.clear();
                    }
                    let logs_dir = self.settings.flows_dir.join("logs");
                    if ui
                        .button("📁 Export")
                        .on_hover_text(format!("Export to {}", logs_dir.display()))
                        .clicked()
                    {
                        match self.notifications.export(&logs_dir) {
                            Ok(path) => self.notifications.info(format!("Exported to {}", path.display())),
                            Err(e) => self.notifications.error(format!("Export failed: {}", e)),
                        }
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for notice in self.notifications.entries() {
                            let color = match notice.level {
                                NoticeLevel::Info => ui.visuals().text_color(),
                                NoticeLevel::Success => egui::Color32::from_rgb(37, 211, 102),
                                NoticeLevel::Warning => egui::Color32::from_rgb(230, 180, 60),
                                NoticeLevel::Error => egui::Color32::from_rgb(220, 80, 80),
                            };
                            ui.label(egui::RichText::new(notice.formatted()).monospace().color(color));
                        }
                    });
            });
    }
}

impl eframe::App for FlowBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_top_panel(ctx);
        if self.show_load_window {
            self.load_window_ui(ctx);
        }
        if self.show_style_window {
            self.style_window_ui(ctx);
        }
        self.show_log_panel(ctx);

        egui::SidePanel::left("palette_panel")
            .resizable(false)
            .default_width(170.0)
            .show(ctx, |ui| {
                if let Some(kind) = palette::show(ui) {
                    self.editor.add_at_view_center(&mut self.store, kind);
                    self.snapshot();
                }
            });

        if let Some(node) = self.store.selected_node().cloned() {
            let mut actions = Vec::new();
            egui::SidePanel::right("config_panel")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    actions = config_panel::show(ui, &node);
                });
            let outcome = config_panel::apply_actions(&mut self.store, &node.id, &actions);
            if outcome.typing {
                self.undo_stack.push_merged(self.store.document(), &node.id);
            } else if outcome.edited || outcome.deleted {
                self.snapshot();
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let typing = ui.ctx().wants_keyboard_input();
            if !typing {
                // Mac uses Cmd+Shift+Z for redo
                if ui.input(|i| i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z)) {
                    self.redo();
                } else if ui.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z)) {
                    self.undo();
                }
                if ui.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Y)) {
                    self.redo();
                }
            }

            let response = self.editor.show(ui, &mut self.store);
            if let Some(id) = &response.dropped {
                self.notifications.info(format!("Added {}", id));
            }
            if response.changed {
                self.snapshot();
            }
        });
    }
}
