pub mod macros;

use morphohw_lib::model::config::{MorphoConfig, RegionConfig, RegionSite};
use morphohw_lib::model::grid::Grid;
use morphohw_lib::model::substrate::{Substrate, SubstrateError};
use std::collections::HashSet;

/// One gene, no binding sites, a single-base coding region emitting `X`.
#[allow(dead_code)]
pub const ONE_GENE_X: &str = "\
0,100: prom,-10,5: ACGTA
0,100: gene,+0,1: 0,1,X
";

/// Three genes wired into a small regulatory network with TF feedback, a
/// morphogen and substrate connections.
#[allow(dead_code)]
pub const FEEDBACK: &str = "\
# gene 0: enhanced by A or connection a, repressed by R
0,100: prom,-8,4: ACGT
0,100: gene,0,6: 0,1,link=a; 2,2,TF=local,,B; 4,1,TF=morph,01010101,M
0,100: enhb,-30,4: 0,2,TF=any,,A; 2,2,N:a
0,100: repb,+8,2: 0,2,TF=any,,R
# gene 1: enhanced by B or connection b, and by its own morphogen
1,200: prom,-8,4: TTGA
1,200: gene,0,5: 0,1,lut=1; 1,2,TF=local,,A; 3,2,TF=cyto,,R
1,200: enhb,-40,4: 0,2,TF=any,,B; 2,2,N:b
1,200: enhb,-20,3: 0,3,TF=any,,M
# gene 2: only ever repressed
2,300: prom,-5,4: GGGG
2,300: gene,0,3: 0,1,link=b; 1,2,TF=local,,A
2,300: repb,+4,2: 0,2,TF=any,,A
";

#[allow(dead_code)]
pub const FEEDBACK_SEEDS: &str = "\
0,0: TF=cyto,,A
1,1: TF=local,,B
2,2: lut=seed
";

/// Substrate double that records every command. A `link=<name>` command
/// makes the connection `N:<name>` present for that cell.
#[derive(Debug, Clone, Default)]
pub struct RecordingSubstrate {
    pub log: Vec<(usize, usize, String)>,
    links: HashSet<(usize, usize, String)>,
    fail_on_command: Option<String>,
    fail_on_query: bool,
}

#[allow(dead_code)]
impl RecordingSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(command: &str) -> Self {
        Self {
            fail_on_command: Some(command.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_queries() -> Self {
        Self {
            fail_on_query: true,
            ..Self::default()
        }
    }

    pub fn commands_at(&self, row: usize, col: usize) -> Vec<&str> {
        self.log
            .iter()
            .filter(|(r, c, _)| *r == row && *c == col)
            .map(|(_, _, cmd)| cmd.as_str())
            .collect()
    }

    pub fn count(&self, row: usize, col: usize, command: &str) -> usize {
        self.commands_at(row, col)
            .into_iter()
            .filter(|c| *c == command)
            .count()
    }
}

impl Substrate for RecordingSubstrate {
    fn configure(&mut self, row: usize, col: usize, command: &str) -> Result<(), SubstrateError> {
        if self.fail_on_command.as_deref() == Some(command) {
            return Err(SubstrateError::new(format!("rejected command {command}")));
        }
        if let Some(name) = command.strip_prefix("link=") {
            self.links.insert((row, col, name.to_string()));
        }
        self.log.push((row, col, command.to_string()));
        Ok(())
    }

    fn query_binding(
        &self,
        row: usize,
        col: usize,
        specifier: &str,
        _locus: i64,
    ) -> Result<bool, SubstrateError> {
        if self.fail_on_query {
            return Err(SubstrateError::new("connection table unavailable"));
        }
        Ok(specifier
            .strip_prefix("N:")
            .is_some_and(|name| self.links.contains(&(row, col, name.to_string()))))
    }
}

/// Configuration for a `rows` x `cols` grid with one cell per region tile
/// and the input anchor at the top-left cell.
#[allow(dead_code)]
pub fn grid_config(rows: usize, cols: usize) -> MorphoConfig {
    let mut config = MorphoConfig::default();
    config.region = RegionConfig {
        min_row: 0,
        min_col: 0,
        max_row: rows - 1,
        max_col: cols - 1,
        horizontal_granularity: 2,
        vertical_granularity: 2,
    };
    config.anchors.inputs = vec![RegionSite::new(0, 0)];
    config.anchors.outputs.clear();
    config
}

#[allow(dead_code)]
pub struct GridBuilder {
    config: MorphoConfig,
    chromosome: String,
    determinants: Option<String>,
}

#[allow(dead_code)]
impl GridBuilder {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            config: grid_config(rows, cols),
            chromosome: String::new(),
            determinants: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut MorphoConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_chromosome(mut self, text: &str) -> Self {
        self.chromosome = text.to_string();
        self
    }

    pub fn with_determinants(mut self, text: &str) -> Self {
        self.determinants = Some(text.to_string());
        self
    }

    pub fn config(&self) -> &MorphoConfig {
        &self.config
    }

    pub fn build<S: Substrate>(self, substrate: &mut S) -> Grid {
        let mut grid =
            Grid::from_text(self.config, &self.chromosome).expect("Failed to build grid");
        if let Some(text) = &self.determinants {
            grid.apply_determinants(text, substrate)
                .expect("Failed to apply determinants");
        }
        grid
    }
}

/// The feedback network on a 4x4 grid, as used by the determinism and
/// snapshot suites.
#[allow(dead_code)]
pub fn feedback_builder(seed: u64) -> GridBuilder {
    GridBuilder::new(4, 4)
        .with_seed(seed)
        .with_chromosome(FEEDBACK)
        .with_determinants(FEEDBACK_SEEDS)
        .with_config(|c| {
            c.expression.activation_threshold = 0.3;
            c.expression.polymerase_ratio = 0.7;
            c.tf.propagation_delay = 1;
        })
}
