use crate::infra::load_config;
use clap::{Args, ValueEnum};
use loan_simulator::error::AppError;
use loan_simulator::simulator::{
    render_text, ArtifactBundle, Dependents, Education, Gender, LoanApplication, LoanSimulator,
    PropertyArea, SimulationView,
};
use loan_simulator::telemetry::{self, LogSink};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum GenderArg {
    Male,
    Female,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DependentsArg {
    #[value(name = "0")]
    Zero,
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    #[value(name = "3+")]
    ThreeOrMore,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum EducationArg {
    Graduate,
    NotGraduate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PropertyAreaArg {
    Rural,
    #[value(alias = "semi-urban")]
    Semiurban,
    Urban,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum YesNo {
    Yes,
    No,
}

impl From<GenderArg> for Gender {
    fn from(value: GenderArg) -> Self {
        match value {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

impl From<DependentsArg> for Dependents {
    fn from(value: DependentsArg) -> Self {
        match value {
            DependentsArg::Zero => Dependents::Zero,
            DependentsArg::One => Dependents::One,
            DependentsArg::Two => Dependents::Two,
            DependentsArg::ThreeOrMore => Dependents::ThreeOrMore,
        }
    }
}

impl From<EducationArg> for Education {
    fn from(value: EducationArg) -> Self {
        match value {
            EducationArg::Graduate => Education::Graduate,
            EducationArg::NotGraduate => Education::NotGraduate,
        }
    }
}

impl From<PropertyAreaArg> for PropertyArea {
    fn from(value: PropertyAreaArg) -> Self {
        match value {
            PropertyAreaArg::Rural => PropertyArea::Rural,
            PropertyAreaArg::Semiurban => PropertyArea::Semiurban,
            PropertyAreaArg::Urban => PropertyArea::Urban,
        }
    }
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value == YesNo::Yes
    }
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Applicant name
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, value_enum)]
    pub(crate) gender: Option<GenderArg>,
    #[arg(long, value_enum)]
    pub(crate) married: Option<YesNo>,
    #[arg(long, value_enum)]
    pub(crate) dependents: Option<DependentsArg>,
    #[arg(long, value_enum)]
    pub(crate) education: Option<EducationArg>,
    #[arg(long, value_enum)]
    pub(crate) self_employed: Option<YesNo>,
    /// Monthly applicant income
    #[arg(long)]
    pub(crate) applicant_income: Option<f64>,
    /// Monthly co-applicant income
    #[arg(long)]
    pub(crate) coapplicant_income: Option<f64>,
    /// Requested amount, in thousands
    #[arg(long)]
    pub(crate) loan_amount: Option<f64>,
    /// Term in months
    #[arg(long)]
    pub(crate) loan_term: Option<f64>,
    /// Whether the applicant's credit history meets the guidelines
    #[arg(long, value_enum)]
    pub(crate) credit_history: Option<YesNo>,
    #[arg(long, value_enum)]
    pub(crate) property_area: Option<PropertyAreaArg>,
    /// Print the verdict as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
    /// Override the directory holding the model artifacts
    #[arg(long)]
    pub(crate) artifact_dir: Option<PathBuf>,
}

impl SimulateArgs {
    /// Form values, with every omitted flag falling back to the form default.
    pub(crate) fn application(&self) -> LoanApplication {
        let defaults = LoanApplication::default();
        LoanApplication {
            name: self.name.clone(),
            gender: self.gender.map(Gender::from).unwrap_or(defaults.gender),
            married: self.married.map(bool::from).unwrap_or(defaults.married),
            dependents: self
                .dependents
                .map(Dependents::from)
                .unwrap_or(defaults.dependents),
            education: self
                .education
                .map(Education::from)
                .unwrap_or(defaults.education),
            self_employed: self
                .self_employed
                .map(bool::from)
                .unwrap_or(defaults.self_employed),
            applicant_income: self.applicant_income.unwrap_or(defaults.applicant_income),
            coapplicant_income: self
                .coapplicant_income
                .unwrap_or(defaults.coapplicant_income),
            loan_amount: self.loan_amount.unwrap_or(defaults.loan_amount),
            loan_amount_term: self.loan_term.unwrap_or(defaults.loan_amount_term),
            credit_history: self
                .credit_history
                .map(bool::from)
                .unwrap_or(defaults.credit_history),
            property_area: self
                .property_area
                .map(PropertyArea::from)
                .unwrap_or(defaults.property_area),
        }
    }
}

pub(crate) fn run_simulation(mut args: SimulateArgs) -> Result<(), AppError> {
    let config = load_config(args.artifact_dir.take())?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let bundle = ArtifactBundle::load(&config.artifacts)?;
    let simulator = LoanSimulator::from_artifacts(bundle);
    let outcome = simulator.simulate(args.application())?;

    if args.json {
        let view = SimulationView::from(&outcome);
        let rendered = serde_json::to_string_pretty(&view)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        println!("{}", render_text(&outcome));
    }
    Ok(())
}
