//! Roster window: activity cards, the signup form, and the feedback banner.

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use roster_core::{
    document::{ListArea, ParticipantsSection, SelectOption, NO_PARTICIPANTS_NOTICE},
    ControlId, Document,
};
use shared::domain::{Severity, StatusMessage};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub struct RosterApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    document: Document,
    feedback: Option<StatusMessage>,
    email_input: String,
    activity_input: String,
    form_resets: u64,
    status: String,
    startup_error: Option<UiError>,
}

impl RosterApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            document: Document::new(),
            feedback: None,
            email_input: String::new(),
            activity_input: String::new(),
            form_resets: 0,
            status: String::new(),
            startup_error: None,
        };
        app.queue(BackendCommand::Load);
        app
    }

    fn queue(&mut self, cmd: BackendCommand) {
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.status.clear();
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Document(document) => self.apply_document(document),
            UiEvent::Feedback(message) => self.feedback = message,
            UiEvent::Error(err) => {
                tracing::debug!(
                    category = ?err.category(),
                    context = ?err.context(),
                    "ui error: {}",
                    err.message()
                );
                self.status = err.message().to_string();
                if err.is_sticky() {
                    self.startup_error = Some(err);
                }
            }
        }
    }

    fn apply_document(&mut self, document: Document) {
        let form = document.form();
        if form.resets != self.form_resets {
            self.form_resets = form.resets;
            self.email_input.clear();
            self.activity_input.clear();
        }
        if !document
            .options()
            .iter()
            .any(|option| option.value == self.activity_input)
        {
            self.activity_input.clear();
        }
        self.document = document;
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("roster_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.heading("Mergington High School");
                    ui.label(egui::RichText::new("Extracurricular Activities").weak());
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        self.queue(BackendCommand::Load);
                    }
                });
            });
            if let Some(err) = &self.startup_error {
                ui.colored_label(egui::Color32::from_rgb(175, 96, 96), err.message());
            } else if !self.status.is_empty() {
                ui.small(egui::RichText::new(&self.status).weak());
            }
            ui.add_space(4.0);
        });
    }

    fn show_signup_form(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("signup_form")
            .resizable(false)
            .min_width(300.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("Sign Up for an Activity");
                ui.add_space(8.0);

                ui.label(egui::RichText::new("Student Email").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut self.email_input)
                        .id_salt("signup_email")
                        .hint_text("your-email@mergington.edu")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(6.0);

                ui.label(egui::RichText::new("Select Activity").strong());
                egui::ComboBox::from_id_salt("signup_activity")
                    .width(ui.available_width())
                    .selected_text(selected_label(self.document.options(), &self.activity_input))
                    .show_ui(ui, |ui| {
                        for option in self.document.options() {
                            ui.selectable_value(
                                &mut self.activity_input,
                                option.value.clone(),
                                &option.label,
                            );
                        }
                    });
                ui.add_space(10.0);

                let busy = self.document.form().busy;
                let button = egui::Button::new(egui::RichText::new("Sign Up").strong())
                    .min_size(egui::vec2(ui.available_width(), 32.0));
                if ui.add_enabled(!busy, button).clicked() {
                    self.queue(BackendCommand::Signup {
                        activity: self.activity_input.clone(),
                        email: self.email_input.clone(),
                    });
                }

                if let Some(message) = &self.feedback {
                    ui.add_space(10.0);
                    feedback_banner(ui, message);
                }
            });
    }

    fn show_activities(&mut self, ctx: &egui::Context) {
        let mut clicked: Option<ControlId> = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Available Activities");
            ui.add_space(6.0);
            egui::ScrollArea::vertical().show(ui, |ui| match self.document.list() {
                ListArea::Notice(text) => {
                    ui.label(text);
                }
                ListArea::Cards(cards) => {
                    for card in cards {
                        egui::Frame::group(ui.style())
                            .corner_radius(8.0)
                            .inner_margin(egui::Margin::symmetric(12, 10))
                            .show(ui, |ui| {
                                ui.set_width(ui.available_width());
                                ui.label(egui::RichText::new(&card.name).strong().size(16.0));
                                ui.label(&card.description);
                                ui.label(format!("Schedule: {}", card.schedule));
                                ui.label(format!("Availability: {}", card.availability()));
                                ui.add_space(4.0);
                                ui.label(egui::RichText::new("Participants").strong());
                                match &card.participants {
                                    ParticipantsSection::Empty => {
                                        ui.label(
                                            egui::RichText::new(NO_PARTICIPANTS_NOTICE)
                                                .italics()
                                                .weak(),
                                        );
                                    }
                                    ParticipantsSection::Rows(rows) => {
                                        for row in rows {
                                            ui.horizontal(|ui| {
                                                ui.label(&row.email);
                                                let remove = ui
                                                    .add_enabled(
                                                        !row.control.busy,
                                                        egui::Button::new("Remove").small(),
                                                    )
                                                    .on_hover_text("Unregister this participant");
                                                if remove.clicked() {
                                                    clicked = Some(row.control.id);
                                                }
                                            });
                                        }
                                    }
                                }
                            });
                        ui.add_space(8.0);
                    }
                }
            });
        });

        if let Some(control) = clicked {
            self.queue(BackendCommand::Remove { control });
        }
    }
}

fn selected_label(options: &[SelectOption], value: &str) -> String {
    options
        .iter()
        .find(|option| option.value == value)
        .or_else(|| options.first())
        .map(|option| option.label.clone())
        .unwrap_or_default()
}

fn feedback_banner(ui: &mut egui::Ui, message: &StatusMessage) {
    let (fill, stroke) = match message.severity {
        Severity::Success => (
            egui::Color32::from_rgb(46, 96, 58),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(96, 160, 110)),
        ),
        Severity::Error => (
            egui::Color32::from_rgb(111, 53, 53),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
        ),
    };
    egui::Frame::NONE
        .fill(fill)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(&message.text).color(egui::Color32::WHITE));
        });
}

impl eframe::App for RosterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_header(ctx);
        self.show_signup_form(ctx);
        self.show_activities(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
