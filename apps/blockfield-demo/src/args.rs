//! Command line parsing.

use anyhow::{anyhow, bail, Context};
use blockfield_app::{
    CollisionPolicyKind, GeometryMode, HeadlessOptions, ScriptedInput, WorldConfig,
};

/// Options parsed from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoArgs {
    pub seed: u64,
    pub render_distance: i32,
    pub chunk_size: u32,
    pub frames: u32,
    pub stepping: bool,
    pub per_block: bool,
    pub async_streaming: bool,
    pub dig_every: u32,
    pub new_world_at: Option<u32>,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            seed: 42,
            render_distance: 4,
            chunk_size: 16,
            frames: 600,
            stepping: false,
            per_block: false,
            async_streaming: false,
            dig_every: 0,
            new_world_at: None,
        }
    }
}

impl DemoArgs {
    /// Parse arguments (without the program name).
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut parsed = Self::default();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--stepping" => parsed.stepping = true,
                "--per-block" => parsed.per_block = true,
                "--async" => parsed.async_streaming = true,
                "--seed" | "--render-distance" | "--chunk-size" | "--frames" | "--dig-every"
                | "--new-world-at" => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| anyhow!("{flag} needs a value"))?;
                    match flag {
                        "--seed" => parsed.seed = parse_value(flag, value)?,
                        "--render-distance" => parsed.render_distance = parse_value(flag, value)?,
                        "--chunk-size" => parsed.chunk_size = parse_value(flag, value)?,
                        "--frames" => parsed.frames = parse_value(flag, value)?,
                        "--dig-every" => parsed.dig_every = parse_value(flag, value)?,
                        _ => parsed.new_world_at = Some(parse_value(flag, value)?),
                    }
                    i += 1;
                }
                other => bail!("Unknown option {other} (try --help)"),
            }
            i += 1;
        }

        Ok(parsed)
    }

    pub fn world_config(&self) -> WorldConfig {
        let collision = if self.stepping {
            CollisionPolicyKind::Stepping
        } else {
            CollisionPolicyKind::FieldClamp
        };
        let geometry = if self.per_block {
            GeometryMode::PerBlock
        } else {
            GeometryMode::PerChunk
        };
        WorldConfig::new(self.seed)
            .with_render_distance(self.render_distance)
            .with_chunk_size(self.chunk_size)
            .with_collision(collision)
            .with_geometry(geometry)
            .with_async_streaming(self.async_streaming)
    }

    pub fn headless_options(&self) -> HeadlessOptions {
        HeadlessOptions {
            frames: self.frames,
            script: ScriptedInput {
                dig_every: self.dig_every,
                ..Default::default()
            },
            new_world_at: self
                .new_world_at
                .map(|frame| (frame, self.seed.wrapping_add(1))),
        }
    }
}

fn parse_value<T>(flag: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid value {value:?} for {flag}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(DemoArgs::parse(&[]).expect("parses"), DemoArgs::default());
    }

    #[test]
    fn parses_all_flags() {
        let parsed = DemoArgs::parse(&args(&[
            "--seed",
            "7",
            "--render-distance",
            "2",
            "--chunk-size",
            "8",
            "--frames",
            "10",
            "--stepping",
            "--per-block",
            "--async",
            "--dig-every",
            "5",
            "--new-world-at",
            "3",
        ]))
        .expect("parses");

        assert_eq!(parsed.seed, 7);
        assert_eq!(parsed.render_distance, 2);
        assert_eq!(parsed.chunk_size, 8);
        assert_eq!(parsed.frames, 10);
        assert!(parsed.stepping && parsed.per_block && parsed.async_streaming);

        let config = parsed.world_config();
        assert_eq!(config.player.collision, CollisionPolicyKind::Stepping);
        assert_eq!(config.streaming.geometry, GeometryMode::PerBlock);
        assert!(config.async_streaming);

        let options = parsed.headless_options();
        assert_eq!(options.script.dig_every, 5);
        assert_eq!(options.new_world_at, Some((3, 8)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(DemoArgs::parse(&args(&["--seed"])).is_err());
        assert!(DemoArgs::parse(&args(&["--frames", "many"])).is_err());
        assert!(DemoArgs::parse(&args(&["--fly"])).is_err());
    }
}
