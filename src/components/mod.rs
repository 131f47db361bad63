pub mod synapse_flow;
