//! Suite collection, discovery, and selection
//!
//! A [`Suite`] owns modules of test cases plus the fixture registry they
//! share. Discovery ([`Suite::collect`]) enumerates cases honoring the
//! `test_` naming convention; a [`Selection`] then narrows the collected set
//! by module, exact id, keyword substring, or mark label. Deselected cases
//! are counted, not reported as skipped.

use testrig_common::error::HarnessError;

use crate::case::TestCase;
use crate::fixture::{Fixture, FixtureRegistry};

/// Prefix a case name must carry to be collected
const NAME_CONVENTION: &str = "test_";

/// A named collection of test modules and their shared fixtures
pub struct Suite {
    name: String,
    fixtures: FixtureRegistry,
    modules: Vec<Module>,
}

struct Module {
    name: String,
    cases: Vec<TestCase>,
}

impl Suite {
    /// Create an empty suite
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fixtures: FixtureRegistry::new(), modules: Vec::new() }
    }

    /// The suite name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a fixture available to every module
    pub fn register_fixture(&mut self, fixture: Fixture) -> Result<(), HarnessError> {
        self.fixtures.register(fixture)
    }

    /// The suite's fixture registry
    pub fn fixtures(&self) -> &FixtureRegistry {
        &self.fixtures
    }

    /// Add a case to a module, creating the module on first use
    ///
    /// The module name is the "file" analog: selection by module and
    /// module-scoped fixture lifecycles both key on it.
    pub fn add(&mut self, module: &str, case: TestCase) {
        match self.modules.iter_mut().find(|m| m.name == module) {
            Some(existing) => existing.cases.push(case),
            None => {
                self.modules.push(Module { name: module.to_string(), cases: vec![case] });
            }
        }
    }

    /// Add several cases to a module (pairs with parametrization)
    pub fn add_all(&mut self, module: &str, cases: Vec<TestCase>) {
        for case in cases {
            self.add(module, case);
        }
    }

    /// Enumerate collectible cases, honoring the naming convention
    ///
    /// Cases whose names do not start with `test_` are not collected; a
    /// warning is logged so a typo does not silently shrink the run.
    pub fn collect(&self) -> Vec<CollectedCase<'_>> {
        let mut collected = Vec::new();
        for module in &self.modules {
            for case in &module.cases {
                if case.name().starts_with(NAME_CONVENTION) {
                    collected.push(CollectedCase { module: &module.name, case });
                } else {
                    tracing::warn!(
                        module = %module.name,
                        case = %case.name(),
                        "case name does not match the 'test_' convention, not collected"
                    );
                }
            }
        }
        collected
    }

    /// Total number of cases added, collectible or not
    pub fn len(&self) -> usize {
        self.modules.iter().map(|m| m.cases.len()).sum()
    }

    /// Whether no cases were added
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("modules", &self.modules.len())
            .field("cases", &self.len())
            .finish()
    }
}

/// A collected case together with its module
#[derive(Clone, Copy)]
pub struct CollectedCase<'a> {
    /// Module ("file") the case belongs to
    pub module: &'a str,
    /// The case definition
    pub case: &'a TestCase,
}

impl CollectedCase<'_> {
    /// Full case id: `module::name[param]`
    pub fn id(&self) -> String {
        format!("{}::{}", self.module, self.case.full_name())
    }
}

/// Narrowing filter applied after collection
///
/// All populated criteria must match (they compose with AND). An empty
/// selection matches everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Run only this module
    pub module: Option<String>,
    /// Run only the case with this exact id (`module::name`, `name`, or a
    /// parametrized `name[id]`)
    pub exact: Option<String>,
    /// Keep cases whose full id contains this substring
    pub keyword: Option<String>,
    /// Keep cases carrying this mark label
    pub label: Option<String>,
}

impl Selection {
    /// Whether no criteria are set
    pub fn is_empty(&self) -> bool {
        self.module.is_none()
            && self.exact.is_none()
            && self.keyword.is_none()
            && self.label.is_none()
    }

    /// Whether a collected case passes every populated criterion
    pub fn matches(&self, collected: &CollectedCase<'_>) -> bool {
        if let Some(module) = &self.module {
            if collected.module != module {
                return false;
            }
        }
        if let Some(exact) = &self.exact {
            let full = collected.case.full_name();
            if collected.id() != *exact && full != *exact && collected.case.name() != exact {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !collected.id().contains(keyword.as_str()) {
                return false;
            }
        }
        if let Some(label) = &self.label {
            if !collected.case.labels().contains(&label.as_str()) {
                return false;
            }
        }
        true
    }
}
