use super::{LegalDocAnalyzer, SuggestionDecision};
use crate::analysis::{AnalysisReport, Severity};
use crate::upload::{FileStatus, NotificationKind, UploadedFileRecord, MAX_UPLOAD_BYTES};
use crate::utils::FileSizeUtils;
use eframe::egui::{self, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const ERROR: Color32 = Color32::from_rgb(220, 50, 50);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Low => Color32::from_rgb(59, 130, 246),
        Severity::Medium => Color32::from_rgb(217, 119, 6),
        Severity::High => Color32::from_rgb(234, 88, 12),
        Severity::Critical => ERROR,
        Severity::Unknown => MUTED,
    }
}

impl LegalDocAnalyzer {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(format!("Analysis service: {}", self.api_url));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let in_flight = self.session.in_flight();
                    if in_flight > 0 {
                        ui.small(format!("{} upload(s) in progress", in_flight));
                        ui.spinner();
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Legal Document Analyzer");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Upload legal documents for AI-powered analysis")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_drop_zone(ui);

                if !self.session.records().is_empty() {
                    ui.add_space(20.0);
                    self.render_library(ui);
                }

                ui.add_space(20.0);
                self.render_analysis(ui);
                ui.add_space(20.0);
            });
        });

        self.render_toasts(ctx);
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let stroke_color = if hovering {
            ACCENT
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };

        let mut select_clicked = false;
        let response = egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("📄").size(32.0));
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("Click to upload or drag and drop")
                            .strong()
                            .color(ACCENT),
                    );
                    ui.small(format!(
                        "PDF, Word documents up to {}",
                        FileSizeUtils::format_size(MAX_UPLOAD_BYTES)
                    ));
                    ui.add_space(12.0);
                    select_clicked = ui.button("Select Document").clicked();
                });
            })
            .response
            .interact(egui::Sense::click());

        if select_clicked || response.clicked() {
            self.pick_file();
        }

        ui.horizontal(|ui| {
            ui.small("Supported formats: PDF, DOCX, DOC");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small("Max size: 25MB");
            });
        });
    }

    fn render_library(&mut self, ui: &mut egui::Ui) {
        // Render from a copy so remove/clear can run inside the loop.
        let records = self.session.tracker().snapshot();
        let mut to_remove = Vec::new();
        let mut clear_all = false;

        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Document Library").strong());
            ui.small("Your uploaded legal documents");
            ui.add_space(8.0);

            for record in &records {
                ui.horizontal(|ui| {
                    ui.label("📄");
                    ui.vertical(|ui| {
                        ui.label(&record.name);
                        ui.small(FileSizeUtils::format_size(record.size_bytes));
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🗑").on_hover_text("Remove").clicked() {
                            to_remove.push(record.id);
                        }
                        render_status(ui, record);
                    });
                });
                if let Some(error) = record.error_message() {
                    ui.colored_label(ERROR, error);
                }
                ui.add_space(4.0);
            }

            ui.separator();
            ui.horizontal(|ui| {
                let count = records.len();
                ui.small(format!(
                    "{} document{}",
                    count,
                    if count == 1 { "" } else { "s" }
                ));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Clear All").clicked() {
                        clear_all = true;
                    }
                });
            });
        });

        for id in to_remove {
            self.session.remove_record(id);
        }
        if clear_all {
            self.session.clear_all();
        }
    }

    fn render_analysis(&mut self, ui: &mut egui::Ui) {
        let Some(report) = self.state.latest_report.clone() else {
            ui.vertical_centered(|ui| {
                ui.colored_label(MUTED, "Upload a document to see its analysis here.");
            });
            return;
        };

        if report.is_empty() {
            ui.colored_label(MUTED, "The analysis service returned no details for this document.");
            return;
        }

        render_summary(ui, &report);
        ui.add_space(12.0);
        render_risks(ui, &report);
        ui.add_space(12.0);
        self.render_suggestions(ui, &report);

        if let Some(text) = &report.review.document_text {
            ui.add_space(12.0);
            egui::CollapsingHeader::new("Document text").show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_source("document_text")
                    .max_height(300.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(text).monospace());
                    });
            });
        }
    }

    fn render_suggestions(&mut self, ui: &mut egui::Ui, report: &AnalysisReport) {
        if report.suggestions.is_empty() {
            return;
        }

        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("AI Suggestions").strong());
            ui.add_space(8.0);

            for suggestion in &report.suggestions {
                let decision = self.state.decision(&suggestion.id);
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&suggestion.title).strong());
                            if !suggestion.clause.is_empty() {
                                ui.small(&suggestion.clause);
                            }
                        });
                        if !suggestion.description.is_empty() {
                            ui.label(&suggestion.description);
                        }
                        if !suggestion.original_text.is_empty() {
                            ui.colored_label(ERROR, format!("− {}", suggestion.original_text));
                        }
                        if !suggestion.suggested_text.is_empty() {
                            ui.colored_label(SUCCESS, format!("+ {}", suggestion.suggested_text));
                        }

                        ui.horizontal(|ui| match decision {
                            SuggestionDecision::Pending => {
                                if ui.button("✅ Accept").clicked() {
                                    self.state
                                        .decide(&suggestion.id, SuggestionDecision::Accepted);
                                }
                                if ui.button("❌ Reject").clicked() {
                                    self.state
                                        .decide(&suggestion.id, SuggestionDecision::Rejected);
                                }
                            }
                            SuggestionDecision::Accepted => {
                                ui.colored_label(SUCCESS, "Accepted");
                            }
                            SuggestionDecision::Rejected => {
                                ui.colored_label(MUTED, "Rejected");
                            }
                        });
                    });
                ui.add_space(6.0);
            }
        });
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        if self.state.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -40.0))
            .show(ctx, |ui| {
                for toast in &self.state.toasts {
                    let (icon, color) = match toast.kind {
                        NotificationKind::Success => ("✅", SUCCESS),
                        NotificationKind::Error => ("❌", ERROR),
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(icon);
                            ui.colored_label(color, &toast.message);
                        });
                    });
                    ui.add_space(4.0);
                }
            });
    }
}

fn render_status(ui: &mut egui::Ui, record: &UploadedFileRecord) {
    match &record.status {
        FileStatus::Uploading => {
            ui.small(format!("{}%", record.progress));
            ui.spinner();
        }
        FileStatus::Processing => {
            ui.small("Processing");
            ui.spinner();
        }
        FileStatus::Complete => {
            ui.colored_label(SUCCESS, "Complete");
        }
        FileStatus::Error(_) => {
            ui.colored_label(ERROR, "Error");
        }
    }
}

fn render_summary(ui: &mut egui::Ui, report: &AnalysisReport) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("Document Summary").strong());
        ui.add_space(8.0);

        egui::Grid::new("document_info")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                if let Some(title) = report.title() {
                    ui.label("Title");
                    ui.label(title);
                    ui.end_row();
                }
                if let Some(summary) = &report.summary {
                    if !summary.document_type.is_empty() {
                        ui.label("Type");
                        ui.label(&summary.document_type);
                        ui.end_row();
                    }
                    if !summary.parties.is_empty() {
                        ui.label("Parties");
                        ui.label(summary.parties.join(", "));
                        ui.end_row();
                    }
                    if let Some(date) = &summary.effective_date {
                        ui.label("Effective");
                        ui.label(date);
                        ui.end_row();
                    }
                    if let Some(date) = &summary.expiration_date {
                        ui.label("Expires");
                        ui.label(date);
                        ui.end_row();
                    }
                    if let Some(status) = &summary.status {
                        ui.label("Status");
                        ui.label(status);
                        ui.end_row();
                    }
                }
                if let Some(pages) = report.review.pages {
                    ui.label("Pages");
                    ui.label(pages.to_string());
                    ui.end_row();
                }
                if !report.review.clauses.is_empty() {
                    ui.label("Clauses");
                    ui.label(report.review.clauses.len().to_string());
                    ui.end_row();
                }
                if let Some(risk) = report.risk_label() {
                    ui.label("Risk score");
                    ui.label(RichText::new(risk).strong());
                    ui.end_row();
                }
            });

        let findings = report
            .summary
            .as_ref()
            .map(|s| s.key_findings.as_slice())
            .unwrap_or_default();
        if !findings.is_empty() {
            ui.add_space(8.0);
            ui.label(RichText::new("Key Findings").strong());
            for finding in findings {
                ui.label(format!("• {}", finding));
            }
        }

        if let Some(summary) = &report.summary {
            if !summary.sections.is_empty() {
                ui.add_space(8.0);
                ui.label(RichText::new("Section Risk Analysis").strong());
                for section in &summary.sections {
                    ui.horizontal(|ui| {
                        ui.label(&section.name);
                        ui.colored_label(
                            severity_color(section.risk_level),
                            section.risk_level.label(),
                        );
                    });
                }
            }
        }

        let distribution = report.risk_distribution();
        let total: f64 = distribution.data.iter().sum();
        if total > 0.0 {
            ui.add_space(8.0);
            ui.label(RichText::new("Risk Distribution").strong());
            for (label, value) in distribution.entries() {
                ui.horizontal(|ui| {
                    ui.add_sized([80.0, 16.0], egui::Label::new(label));
                    ui.add(
                        egui::ProgressBar::new((value / total) as f32)
                            .text(format!("{}", value))
                            .fill(severity_color(Severity::from(label.to_string()))),
                    );
                });
            }
        }
    });
}

fn render_risks(ui: &mut egui::Ui, report: &AnalysisReport) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("Identified Risks").strong());
        ui.small("Potential legal issues detected in the document");
        ui.add_space(8.0);

        if report.risk.risky_clauses.is_empty() {
            ui.colored_label(MUTED, "No risky clauses were reported.");
            return;
        }

        for risk in &report.risk.risky_clauses {
            egui::Frame::none()
                .fill(ui.style().visuals.extreme_bg_color)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&risk.title).strong());
                        ui.colored_label(severity_color(risk.severity), risk.severity.label());
                    });
                    if !risk.description.is_empty() {
                        ui.label(&risk.description);
                    }
                    let location = match (risk.clause.is_empty(), risk.page) {
                        (false, Some(page)) => format!("{} · Page {}", risk.clause, page),
                        (false, None) => risk.clause.clone(),
                        (true, Some(page)) => format!("Page {}", page),
                        (true, None) => String::new(),
                    };
                    if !location.is_empty() {
                        ui.small(location);
                    }
                });
            ui.add_space(6.0);
        }
    });
}
