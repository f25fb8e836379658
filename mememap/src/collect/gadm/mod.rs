pub mod gadm_collect;
