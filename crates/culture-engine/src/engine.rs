// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! The step loop
//!
//! Per integration step:
//! 1. apply due pulse stimulation (forced depolarization to `2 * v_peak`)
//! 2. per neuron: sample minis and white noise, integrate, check threshold
//! 3. propagate spikes through the outgoing edge lists, reading synaptic
//!    resources before any reset touches them
//! 4. apply after-spike resets
//! 5. feed the monitors, when attached

use crate::monitors::{RateMonitor, SpikeMonitor, StateMonitor};
use crate::recording::{Recording, RecordingMeta, StateTraces};
use crate::stimulation::StimulationPattern;
use crate::{EngineError, Result, STATE_VAR_NAMES};

use culture_config::CultureConfig;
use culture_neural::{
    reset_after_spike, step_neuron, synaptic_transmission, NeuronState, QifParameters,
};
use culture_topology::Topology;
use culture_types::{ms_to_s, NeuronId, SpikeRecord};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Poisson, StandardNormal};
use std::collections::BTreeMap;

/// Deterministic, step-driven simulation of one culture.
pub struct SimulationEngine {
    config: CultureConfig,
    params: QifParameters,
    dt_ms: f64,

    num_neurons: usize,
    num_modules: usize,
    topology_name: Option<String>,
    outgoing: Vec<Vec<NeuronId>>,

    states: Vec<NeuronState>,
    rng: ChaCha8Rng,

    // background minis; `None` when the rate is zero
    mini_base: Option<Poisson<f64>>,
    // base + extra rate, for neurons targeted by poisson stimulation
    mini_stimulated: Option<Poisson<f64>>,

    stimulation: StimulationPattern,
    stim_mask: Vec<bool>,
    pulse_interval_steps: u64,

    time_ms: f64,
    time_offset_ms: f64,
    step_count: u64,

    monitors_active: bool,
    spike_monitor: SpikeMonitor,
    state_monitor: Option<StateMonitor>,
    rate_monitor: Option<RateMonitor>,
    stim_records: Vec<SpikeRecord>,

    // scratch, reused every step
    fired: Vec<NeuronId>,
}

impl SimulationEngine {
    /// Build an engine for one topology and configuration.
    ///
    /// The initial membrane potentials are scattered a few mV above the
    /// reset potential, so the culture does not start fully synchronized.
    pub fn new(topology: &Topology, config: &CultureConfig) -> Result<Self> {
        topology.validate()?;
        culture_config::validate_config(config)?;

        for &n in &config.recording.state_neurons {
            if n as usize >= topology.num_neurons {
                return Err(EngineError::StateNeuronOutOfRange(n));
            }
        }

        let params = QifParameters::from_config(config);
        let dt_ms = config.simulation.dt_ms;
        let mut rng = ChaCha8Rng::seed_from_u64(config.simulation.seed);

        let states: Vec<NeuronState> = (0..topology.num_neurons)
            .map(|_| {
                let mut state = NeuronState::resting(&params);
                state.v = params.v_reset + 5.0 * rng.gen::<f64>();
                state
            })
            .collect();

        let stimulation = StimulationPattern::from(config);
        let stim_mask = stimulation.target_mask(topology);
        let pulse_interval_steps = match &stimulation {
            StimulationPattern::Pulse { interval_ms, .. } => {
                (interval_ms / dt_ms).round().max(1.0) as u64
            }
            _ => 0,
        };

        let base_mean = config.noise.mini_rate_hz * 1e-3 * dt_ms;
        let extra_mean = match &stimulation {
            StimulationPattern::Poisson { extra_rate_hz, .. } => extra_rate_hz * 1e-3 * dt_ms,
            _ => 0.0,
        };
        let mini_base = (base_mean > 0.0).then(|| Poisson::new(base_mean).unwrap());
        let stim_mean = base_mean + extra_mean;
        let mini_stimulated = (stim_mean > 0.0).then(|| Poisson::new(stim_mean).unwrap());

        tracing::info!(
            neurons = topology.num_neurons,
            modules = topology.num_modules(),
            edges = topology.edges.len(),
            seed = config.simulation.seed,
            dt_ms,
            "engine ready"
        );

        Ok(Self {
            config: config.clone(),
            params,
            dt_ms,
            num_neurons: topology.num_neurons,
            num_modules: topology.num_modules(),
            topology_name: topology.name.clone(),
            outgoing: topology.outgoing_targets(),
            states,
            rng,
            mini_base,
            mini_stimulated,
            stimulation,
            stim_mask,
            pulse_interval_steps,
            time_ms: 0.0,
            time_offset_ms: 0.0,
            step_count: 0,
            monitors_active: false,
            spike_monitor: SpikeMonitor::new(),
            state_monitor: None,
            rate_monitor: None,
            stim_records: Vec::new(),
            fired: Vec::new(),
        })
    }

    /// Current simulated time in ms, relative to monitor attachment.
    pub fn time_ms(&self) -> f64 {
        self.time_ms - self.time_offset_ms
    }

    /// Read access to a neuron's state, mainly for tests and probes.
    pub fn state(&self, neuron: NeuronId) -> Option<&NeuronState> {
        self.states.get(neuron.index())
    }

    /// Advance the culture by one integration step.
    pub fn step(&mut self) {
        let dt = self.dt_ms;

        // pulse stimulation: depolarize targets past the peak; they fire on
        // this step's threshold check (about one timestep of delay overall)
        let pulse_due = self.pulse_interval_steps > 0
            && self.step_count > 0
            && self.step_count % self.pulse_interval_steps == 0;
        if pulse_due {
            let stim_time_s = ms_to_s(self.time_ms - self.time_offset_ms);
            for idx in 0..self.num_neurons {
                if self.stim_mask[idx] {
                    self.states[idx].v = 2.0 * self.params.v_peak;
                    if self.monitors_active {
                        self.stim_records
                            .push(SpikeRecord::new(NeuronId(idx as u32), stim_time_s));
                    }
                }
            }
        }

        // integrate all neurons
        self.fired.clear();
        let poisson_stim = matches!(self.stimulation, StimulationPattern::Poisson { .. });
        for idx in 0..self.num_neurons {
            let minis = if poisson_stim && self.stim_mask[idx] {
                self.mini_stimulated
            } else {
                self.mini_base
            };
            if let Some(dist) = minis {
                let count: f64 = self.rng.sample(dist);
                if count > 0.0 {
                    self.states[idx].i_syn += count * self.config.noise.j_mini;
                }
            }
            let noise: f64 = self.rng.sample(StandardNormal);
            if step_neuron(&mut self.states[idx], &self.params, dt, noise) {
                self.fired.push(NeuronId(idx as u32));
            }
        }

        // propagate with pre-reset resources, then reset
        let fired = std::mem::take(&mut self.fired);
        for &pre in &fired {
            let d_pre = self.states[pre.index()].d;
            for tdx in 0..self.outgoing[pre.index()].len() {
                let post = self.outgoing[pre.index()][tdx];
                let h_post = self.states[post.index()].h;
                self.states[post.index()].i_syn +=
                    synaptic_transmission(d_pre, h_post, &self.params);
            }
        }
        for &pre in &fired {
            reset_after_spike(&mut self.states[pre.index()], &self.params);
        }

        self.time_ms += dt;
        self.step_count += 1;

        if self.monitors_active {
            let t_rel_ms = self.time_ms - self.time_offset_ms;
            for &neuron in &fired {
                self.spike_monitor.record(neuron, t_rel_ms);
            }
            if let Some(monitor) = self.rate_monitor.as_mut() {
                monitor.record(t_rel_ms, fired.len());
            }
            if let Some(monitor) = self.state_monitor.as_mut() {
                if monitor.due() {
                    let samples: Vec<[f64; 5]> = monitor
                        .neurons()
                        .iter()
                        .map(|n| {
                            let s = &self.states[n.index()];
                            [s.v, s.i_syn, s.u, s.d, s.h]
                        })
                        .collect();
                    monitor.record(t_rel_ms, samples.into_iter());
                }
            }
        }
        self.fired = fired;
    }

    /// Warm the culture up without recording.
    ///
    /// Monitors attach when this returns; recorded times start at zero here.
    pub fn equilibrate(&mut self) {
        let steps = self.steps_for(self.config.simulation.equilibration_s);
        tracing::info!(
            duration_s = self.config.simulation.equilibration_s,
            "equilibrating"
        );
        self.run_steps(steps);
        self.attach_monitors();
    }

    /// Run the recorded part of the simulation.
    pub fn run(&mut self) {
        if !self.monitors_active {
            self.attach_monitors();
        }
        let steps = self.steps_for(self.config.simulation.duration_s);
        tracing::info!(duration_s = self.config.simulation.duration_s, "running");
        self.run_steps(steps);
    }

    fn attach_monitors(&mut self) {
        self.monitors_active = true;
        self.time_offset_ms = self.time_ms;
        if self.config.recording.record_state {
            let neurons = self
                .config
                .recording
                .state_neurons
                .iter()
                .map(|&n| NeuronId(n))
                .collect();
            self.state_monitor = Some(StateMonitor::new(
                neurons,
                self.config.recording.state_stride,
            ));
        }
        if self.config.recording.record_rates {
            self.rate_monitor = Some(RateMonitor::new(
                self.config.recording.rate_bin_ms,
                self.num_neurons,
            ));
        }
    }

    fn steps_for(&self, duration_s: f64) -> u64 {
        (duration_s * 1e3 / self.dt_ms).round() as u64
    }

    fn run_steps(&mut self, steps: u64) {
        // progress report once per simulated minute
        let report_every = self.steps_for(60.0).max(1);
        for n in 0..steps {
            self.step();
            if n > 0 && n % report_every == 0 {
                tracing::info!(
                    simulated_s = (n as f64 * self.dt_ms * 1e-3) as u64,
                    spikes = self.spike_monitor.len(),
                    "progress"
                );
            }
        }
    }

    /// Finish the run and assemble the recording document.
    pub fn into_recording(self) -> Recording {
        let state = self.state_monitor.map(|monitor| {
            let mut variables = BTreeMap::new();
            for (var, name) in STATE_VAR_NAMES.iter().enumerate() {
                let matrix = monitor.trace_matrix(var);
                let rows = matrix
                    .outer_iter()
                    .map(|row| row.to_vec())
                    .collect::<Vec<_>>();
                variables.insert((*name).to_string(), rows);
            }
            StateTraces {
                neurons: monitor.neurons().iter().map(|n| n.0).collect(),
                time_s: monitor.time_axis_s().to_vec(),
                variables,
            }
        });

        let population_rate_smoothed = self.rate_monitor.map(|m| m.smoothed_rate());
        let stimulation_times_as_list =
            (!self.stimulation.is_off()).then_some(self.stim_records);

        let spiketimes = self
            .spike_monitor
            .to_padded_matrix(self.num_neurons)
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        Recording {
            meta: RecordingMeta {
                created_utc: Recording::timestamp_now(),
                seed: self.config.simulation.seed,
                j_ampa: self.config.synapse.j_ampa,
                j_mini: self.config.noise.j_mini,
                tau_depression_s: self.config.synapse.tau_depression_s,
                mini_rate_hz: self.config.noise.mini_rate_hz,
                simulation_duration_s: self.config.simulation.duration_s,
                equilibration_duration_s: self.config.simulation.equilibration_s,
                num_neurons: self.num_neurons,
                num_modules: self.num_modules,
                topology_name: self.topology_name,
            },
            descriptions: Recording::dataset_descriptions(
                state.is_some(),
                population_rate_smoothed.is_some(),
                stimulation_times_as_list.is_some(),
            ),
            spiketimes_as_list: self.spike_monitor.into_records(),
            spiketimes,
            state,
            population_rate_smoothed,
            stimulation_times_as_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use culture_topology::TopologyBuilder;

    fn short_config(seed: u64) -> CultureConfig {
        let mut config = CultureConfig::default();
        config.simulation.seed = seed;
        config.simulation.duration_s = 2.0;
        config.simulation.equilibration_s = 0.5;
        config
    }

    fn small_topology(seed: u64) -> Topology {
        TopologyBuilder::new()
            .modules(4)
            .neurons_per_module(10)
            .k_in(4)
            .k_inter(2)
            .seed(seed)
            .build()
    }

    #[test]
    fn test_engine_produces_spikes() {
        let config = short_config(117);
        let topology = small_topology(117);
        let mut engine = SimulationEngine::new(&topology, &config).unwrap();
        engine.equilibrate();
        engine.run();
        let recording = engine.into_recording();
        assert!(
            !recording.spiketimes_as_list.is_empty(),
            "37 Hz of 25 mV minis must elicit spikes within 2 s"
        );
        // recorded times are relative to the end of equilibration
        for spike in &recording.spiketimes_as_list {
            assert!(spike.time_s >= 0.0 && spike.time_s <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_recording() {
        let config = short_config(42);
        let topology = small_topology(42);

        let mut a = SimulationEngine::new(&topology, &config).unwrap();
        a.equilibrate();
        a.run();
        let ra = a.into_recording();

        let mut b = SimulationEngine::new(&topology, &config).unwrap();
        b.equilibrate();
        b.run();
        let rb = b.into_recording();

        assert!(ra.payload_eq(&rb));
    }

    #[test]
    fn test_different_seed_different_spikes() {
        let topology = small_topology(42);

        let mut a = SimulationEngine::new(&topology, &short_config(1)).unwrap();
        a.equilibrate();
        a.run();
        let ra = a.into_recording();

        let mut b = SimulationEngine::new(&topology, &short_config(2)).unwrap();
        b.equilibrate();
        b.run();
        let rb = b.into_recording();

        assert_ne!(ra.spiketimes_as_list, rb.spiketimes_as_list);
    }

    #[test]
    fn test_pulse_stimulation_records_times() {
        let mut config = short_config(7);
        config.stimulation.mode = "pulse".to_string();
        config.stimulation.target_modules = vec![0];
        config.stimulation.pulse_interval_ms = 400.0;
        let topology = small_topology(7);

        let mut engine = SimulationEngine::new(&topology, &config).unwrap();
        engine.equilibrate();
        engine.run();
        let recording = engine.into_recording();

        let stim = recording.stimulation_times_as_list.expect("stim enabled");
        assert!(!stim.is_empty());
        // only module 0 neurons are targeted
        for record in &stim {
            assert!(record.neuron.index() < 10);
        }
        // pulses arrive every 400 ms: 10 neurons x ~5 pulses in 2 s
        assert!(stim.len() >= 40);
    }

    #[test]
    fn test_state_neuron_out_of_range_rejected() {
        let mut config = short_config(7);
        config.recording.state_neurons = vec![999];
        let topology = small_topology(7);
        assert!(matches!(
            SimulationEngine::new(&topology, &config),
            Err(EngineError::StateNeuronOutOfRange(999))
        ));
    }

    #[test]
    fn test_state_traces_shapes() {
        let mut config = short_config(9);
        config.recording.state_neurons = vec![0, 1];
        config.recording.state_stride = 100;
        let topology = small_topology(9);

        let mut engine = SimulationEngine::new(&topology, &config).unwrap();
        engine.equilibrate();
        engine.run();
        let recording = engine.into_recording();

        let state = recording.state.expect("state recording enabled");
        assert_eq!(state.neurons, vec![0, 1]);
        let samples = state.time_s.len();
        assert!(samples > 0);
        for name in STATE_VAR_NAMES {
            let rows = &state.variables[name];
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].len(), samples);
        }
        // depression stays within (0, 1] under the default dynamics
        for &d in state.variables["D"].iter().flatten() {
            assert!(d > 0.0 && d <= 1.0 + 1e-9);
        }
    }
}
