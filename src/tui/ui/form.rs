//! Survey input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{bounds, Category, FieldBounds, InputRecord, Locale};
use crate::tui::styles::Theme;

/// One question on the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Gender,
    Age,
    Height,
    Weight,
    FamilyHistory,
    Favc,
    Fcvc,
    Ncp,
    Caec,
    Smoke,
    Ch2o,
    Scc,
    Faf,
    Tue,
    Calc,
    Mtrans,
}

/// Numeric fields, in the order of `FormState::inputs`.
const NUMERIC: [Field; 8] = [
    Field::Age,
    Field::Height,
    Field::Weight,
    Field::Fcvc,
    Field::Ncp,
    Field::Ch2o,
    Field::Faf,
    Field::Tue,
];

impl Field {
    pub const ALL: [Self; 16] = [
        Self::Gender,
        Self::Age,
        Self::Height,
        Self::Weight,
        Self::FamilyHistory,
        Self::Favc,
        Self::Fcvc,
        Self::Ncp,
        Self::Caec,
        Self::Smoke,
        Self::Ch2o,
        Self::Scc,
        Self::Faf,
        Self::Tue,
        Self::Calc,
        Self::Mtrans,
    ];

    #[must_use]
    pub fn title(self, locale: Locale) -> &'static str {
        match self {
            Self::Gender => locale.pick("Jenis Kelamin", "Gender"),
            Self::Age => locale.pick("Usia", "Age"),
            Self::Height => locale.pick("Tinggi Badan (m)", "Height (m)"),
            Self::Weight => locale.pick("Berat Badan (kg)", "Weight (kg)"),
            Self::FamilyHistory => locale.pick(
                "Riwayat keluarga kelebihan berat badan",
                "Family history of overweight",
            ),
            Self::Favc => locale.pick(
                "Sering makan makanan tinggi kalori",
                "Frequent high-calorie food",
            ),
            Self::Fcvc => locale.pick("Frekuensi makan sayur (1-3)", "Vegetable frequency (1-3)"),
            Self::Ncp => locale.pick("Jumlah makan utama per hari (1-4)", "Main meals per day (1-4)"),
            Self::Caec => locale.pick("Makan di antara waktu makan", "Eating between meals"),
            Self::Smoke => locale.pick("Merokok", "Smoker"),
            Self::Ch2o => locale.pick("Gelas air per hari (1-10)", "Glasses of water per day (1-10)"),
            Self::Scc => locale.pick("Memantau kalori", "Monitors calories"),
            Self::Faf => locale.pick("Aktivitas fisik (0-3)", "Physical activity (0-3)"),
            Self::Tue => locale.pick("Jam penggunaan gawai (0-10)", "Hours on devices (0-10)"),
            Self::Calc => locale.pick("Konsumsi alkohol", "Alcohol consumption"),
            Self::Mtrans => locale.pick("Transportasi utama", "Main transport"),
        }
    }

    /// Limits for numeric fields; `None` for choice fields.
    #[must_use]
    pub fn bounds(self) -> Option<FieldBounds> {
        match self {
            Self::Age => Some(bounds::AGE),
            Self::Height => Some(bounds::HEIGHT),
            Self::Weight => Some(bounds::WEIGHT),
            Self::Fcvc => Some(bounds::FCVC),
            Self::Ncp => Some(bounds::NCP),
            Self::Ch2o => Some(bounds::CH2O),
            Self::Faf => Some(bounds::FAF),
            Self::Tue => Some(bounds::TUE),
            _ => None,
        }
    }

    fn numeric_index(self) -> Option<usize> {
        NUMERIC.iter().position(|f| *f == self)
    }
}

/// Form state: text buffers for numbers, enum values for choices.
pub struct FormState {
    pub locale: Locale,
    pub selected_field: usize,
    pub error_message: Option<String>,
    /// Choice answers; numeric fields of the draft are not used
    choices: InputRecord,
    inputs: [String; 8],
}

impl FormState {
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        let mut state = Self {
            locale,
            selected_field: 0,
            error_message: None,
            choices: InputRecord::default(),
            inputs: Default::default(),
        };
        state.fill_from(&InputRecord::default());
        state
    }

    fn fill_from(&mut self, record: &InputRecord) {
        self.choices = record.clone();
        let values = [
            format_measure(record.age),
            format_measure(record.height),
            format_measure(record.weight),
            record.fcvc.to_string(),
            record.ncp.to_string(),
            record.ch2o.to_string(),
            record.faf.to_string(),
            record.tue.to_string(),
        ];
        for (input, value) in self.inputs.iter_mut().zip(values) {
            input.zeroize();
            input.push_str(&value);
        }
    }

    #[must_use]
    pub fn field(&self) -> Field {
        Field::ALL[self.selected_field]
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % Field::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.selected_field = (self.selected_field + Field::ALL.len() - 1) % Field::ALL.len();
    }

    /// Type into the selected numeric field.
    pub fn input_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        if let Some(i) = self.field().numeric_index() {
            self.inputs[i].push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(i) = self.field().numeric_index() {
            self.inputs[i].pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(i) = self.field().numeric_index() {
            self.inputs[i].zeroize();
        }
    }

    /// Step the selected choice field forward or backward.
    pub fn cycle(&mut self, forward: bool) {
        fn step<C: Category>(value: &mut C, forward: bool) {
            *value = if forward { value.next() } else { value.prev() };
        }
        let field = self.field();
        let c = &mut self.choices;
        match field {
            Field::Gender => step(&mut c.gender, forward),
            Field::FamilyHistory => step(&mut c.family_history_with_overweight, forward),
            Field::Favc => step(&mut c.favc, forward),
            Field::Caec => step(&mut c.caec, forward),
            Field::Smoke => step(&mut c.smoke, forward),
            Field::Scc => step(&mut c.scc, forward),
            Field::Calc => step(&mut c.calc, forward),
            Field::Mtrans => step(&mut c.mtrans, forward),
            _ => return,
        }
        self.error_message = None;
    }

    /// Text shown for `field`.
    #[must_use]
    pub fn display_value(&self, field: Field) -> &str {
        if let Some(i) = field.numeric_index() {
            return &self.inputs[i];
        }
        let c = &self.choices;
        let locale = self.locale;
        match field {
            Field::Gender => c.gender.label(locale),
            Field::FamilyHistory => c.family_history_with_overweight.label(locale),
            Field::Favc => c.favc.label(locale),
            Field::Caec => c.caec.label(locale),
            Field::Smoke => c.smoke.label(locale),
            Field::Scc => c.scc.label(locale),
            Field::Calc => c.calc.label(locale),
            _ => c.mtrans.label(locale),
        }
    }

    /// Wipe typed values and restore defaults.
    pub fn clear_sensitive(&mut self) {
        for input in &mut self.inputs {
            input.zeroize();
        }
        self.fill_from(&InputRecord::default());
        self.error_message = None;
        self.selected_field = 0;
    }

    pub fn load_sample_data(&mut self) {
        self.fill_from(&InputRecord::sample());
        self.error_message = None;
    }

    /// Parse and range-check the form.
    ///
    /// # Errors
    /// Returns every problem found, joined into one message.
    pub fn to_input_record(&self) -> Result<InputRecord, String> {
        let mut values = [0.0f64; 8];
        let mut errors = Vec::new();

        for (i, field) in NUMERIC.iter().enumerate() {
            let raw = self.inputs[i].trim();
            match raw.parse::<f64>() {
                Ok(v) => {
                    if let Some(msg) = field.bounds().and_then(|b| b.check(v)) {
                        errors.push(msg);
                    }
                    values[i] = v;
                }
                Err(_) => errors.push(format!(
                    "{}: {}",
                    field.title(self.locale),
                    self.locale.pick("bukan angka", "not a number")
                )),
            }
        }
        if !errors.is_empty() {
            return Err(errors.join(", "));
        }

        // Slider values are whole numbers within u8 range once checked.
        let [age, height, weight, fcvc, ncp, ch2o, faf, tue] = values;
        let record = InputRecord {
            age,
            height,
            weight,
            fcvc: fcvc as u8,
            ncp: ncp as u8,
            ch2o: ch2o as u8,
            faf: faf as u8,
            tue: tue as u8,
            ..self.choices.clone()
        };
        record.validate().map_err(|e| e.join(", "))?;
        Ok(record)
    }
}

fn format_measure(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}

/// Render the survey form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state.locale);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, locale: Locale) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Theme::text()),
        Span::styled(
            locale.pick("Prediksi Tingkat Obesitas", "Obesity Level Prediction"),
            Theme::title(),
        ),
        Span::styled(
            locale.pick(" │ Kebiasaan makan & kondisi fisik", " │ Eating habits & physical condition"),
            Theme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = Field::ALL.len() / 2;
    render_field_column(f, columns[0], state, &Field::ALL[..mid], 0);
    render_field_column(f, columns[1], state, &Field::ALL[mid..], mid);
}

fn render_field_column(f: &mut Frame, area: Rect, state: &FormState, fields: &[Field], offset: usize) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == state.selected_field;
        let (border_style, title_style) = if is_selected {
            (Theme::border_focused(), Theme::focused())
        } else {
            (Theme::border(), Theme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.title(state.locale)), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = Span::styled(state.display_value(*field), Theme::text());
        let line = match (field.bounds(), is_selected) {
            (None, true) => Line::from(vec![
                Span::styled(" ◀ ", Theme::cursor()),
                value,
                Span::styled(" ▶", Theme::cursor()),
            ]),
            (None, false) => Line::from(vec![Span::raw("   "), value]),
            (Some(_), true) => Line::from(vec![Span::raw(" "), value, Span::styled("▌", Theme::cursor())]),
            (Some(_), false) => Line::from(vec![Span::raw(" "), value]),
        };

        f.render_widget(Paragraph::new(line).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let locale = state.locale;
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", Theme::danger()),
            Span::styled(err.clone(), Theme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", Theme::key_hint()),
            Span::styled(locale.pick("Pindah ", "Navigate "), Theme::key_desc()),
            Span::styled("[←→] ", Theme::key_hint()),
            Span::styled(locale.pick("Pilih ", "Choose "), Theme::key_desc()),
            Span::styled("[Enter] ", Theme::key_hint()),
            Span::styled(locale.pick("Prediksi ", "Predict "), Theme::key_desc()),
            Span::styled("[S] ", Theme::key_hint()),
            Span::styled(locale.pick("Contoh ", "Sample "), Theme::key_desc()),
            Span::styled("[L] ", Theme::key_hint()),
            Span::styled(locale.pick("Bahasa ", "Language "), Theme::key_desc()),
            Span::styled("[Esc] ", Theme::key_hint()),
            Span::styled(locale.pick("Keluar", "Quit"), Theme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Gender, Transport};

    #[test]
    fn test_defaults_parse() {
        let state = FormState::new(Locale::Indonesian);
        assert_eq!(state.to_input_record(), Ok(InputRecord::default()));
        assert_eq!(state.display_value(Field::Height), "1.7");
        assert_eq!(state.display_value(Field::Gender), "Pria");
    }

    #[test]
    fn test_sample_data() {
        let mut state = FormState::new(Locale::English);
        state.load_sample_data();
        assert_eq!(state.to_input_record(), Ok(InputRecord::sample()));
        assert_eq!(state.display_value(Field::Mtrans), "Public transport");
    }

    #[test]
    fn test_typing_only_affects_numeric_fields() {
        let mut state = FormState::new(Locale::English);
        state.input_char('9');
        assert_eq!(state.display_value(Field::Gender), "Male");

        state.next_field(); // Age
        state.clear_field();
        state.input_char('4');
        state.input_char('x');
        state.input_char('0');
        assert_eq!(state.display_value(Field::Age), "40");
        state.delete_char();
        assert_eq!(state.display_value(Field::Age), "4");
    }

    #[test]
    fn test_cycle_choices() {
        let mut state = FormState::new(Locale::English);
        state.cycle(true);
        let record = state.to_input_record().expect("valid");
        assert_eq!(record.gender, Gender::Female);

        state.selected_field = Field::ALL.iter().position(|f| *f == Field::Caec).expect("caec");
        state.cycle(true);
        state.cycle(true);
        assert_eq!(state.to_input_record().expect("valid").caec, Frequency::Frequently);

        state.selected_field = Field::ALL.len() - 1;
        state.cycle(false);
        assert_eq!(state.to_input_record().expect("valid").mtrans, Transport::Walking);
    }

    #[test]
    fn test_out_of_range_and_garbage() {
        let mut state = FormState::new(Locale::English);
        state.inputs[0] = "5".into(); // age
        state.inputs[4] = "2.5".into(); // NCP
        state.inputs[2] = String::new(); // weight
        let err = state.to_input_record().expect_err("invalid");
        assert!(err.contains("Age 5 out of range"));
        assert!(err.contains("NCP 2.5 must be a whole number"));
        assert!(err.contains("Weight (kg): not a number"));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = FormState::new(Locale::English);
        state.prev_field();
        assert_eq!(state.field(), Field::Mtrans);
        state.next_field();
        assert_eq!(state.field(), Field::Gender);
    }

    #[test]
    fn test_clear_sensitive_restores_defaults() {
        let mut state = FormState::new(Locale::English);
        state.inputs[2] = "150".into();
        state.cycle(true);
        state.selected_field = 5;
        state.clear_sensitive();
        assert_eq!(state.selected_field, 0);
        assert_eq!(state.to_input_record(), Ok(InputRecord::default()));
    }
}
